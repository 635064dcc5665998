//! Turning an inventory snapshot into a [`ScoreBreakdown`].
//!
//! A [`RatingEngine`] holds the immutable catalogs. Each call to
//! [`RatingEngine::rate`] classifies the snapshot from scratch and keeps all
//! derived state local to that call, so one engine can serve any number of
//! ratings (wrap it in an `Arc` with the `arc` feature to share it across
//! threads).

/// Per-bucket diminishing-return scoring
pub mod bucket;
/// Output records
pub mod breakdown;
/// Deciding which owned copies count
pub mod classify;
/// Marginal value of unobtained weapons and contribution of obtained ones
pub mod marginal;

use tracing::{debug, info, warn};

use crate::Rc;
use crate::catalog::keys::{DEFAULT_ICON_HOST, UNKNOWN_WEAPON_TYPE};
use crate::catalog::types::{
    BucketCatalog, CatalogProvider, ItemHash, PerkWeights, WeaponCatalog, WeaponRecord,
};
use crate::inventory::InventorySnapshot;
use crate::perks::{DesiredPerkSets, PerkIndex};

use self::breakdown::{
    BucketDetail, InventoryRating, NextWeapon, PerkDetail, ScoreBreakdown, WeaponDetail,
};
use self::bucket::score_bucket;
use self::classify::{Ownership, QualifyingCopy, classify};
use self::marginal::{contribution, estimate, recommend};

pub struct RatingEngine {
    buckets: BucketCatalog,
    weapons: WeaponCatalog,
    perks: PerkIndex,
    weights: PerkWeights,
    desired: DesiredPerkSets,
    icon_host: String,
}

impl CatalogProvider for RatingEngine {
    fn weapon_by_name(&self, name: &str) -> Option<Rc<WeaponRecord>> {
        self.weapons.weapon_by_name(name)
    }

    fn weapon_by_item_hash(&self, hash: ItemHash) -> Option<Rc<WeaponRecord>> {
        self.weapons.weapon_by_item_hash(hash)
    }

    fn weapons(&self) -> &[Rc<WeaponRecord>] {
        self.weapons.weapons()
    }
}

impl RatingEngine {
    pub fn new(
        buckets: BucketCatalog,
        weapons: WeaponCatalog,
        perks: PerkIndex,
        weights: PerkWeights,
    ) -> Self {
        let desired = DesiredPerkSets::build(&weapons, &perks);
        debug!(
            "rating engine ready: {} buckets, {} weapons, {} perks",
            buckets.buckets().len(),
            weapons.weapons().len(),
            perks.len()
        );
        if weights.is_empty() {
            debug!("no perk weights configured");
        }

        RatingEngine {
            buckets,
            weapons,
            perks,
            weights,
            desired,
            icon_host: DEFAULT_ICON_HOST.to_owned(),
        }
    }

    /// Host prepended to manifest icon paths.
    pub fn with_icon_host(mut self, host: impl Into<String>) -> Self {
        self.icon_host = host.into();
        self
    }

    pub fn buckets(&self) -> &BucketCatalog {
        &self.buckets
    }

    pub fn weights(&self) -> &PerkWeights {
        &self.weights
    }

    pub fn classify(&self, snapshot: &InventorySnapshot) -> Ownership {
        classify(snapshot, &self.weapons, &self.desired)
    }

    pub fn rate(&self, snapshot: &InventorySnapshot) -> ScoreBreakdown {
        let ownership = self.classify(snapshot);
        let breakdown = self.aggregate(&ownership);
        info!(
            "rated {} qualifying copies: {:.2} of {:.2} points",
            ownership.len(),
            breakdown.total_points(),
            breakdown.max_possible_points()
        );
        breakdown
    }

    /// Build the full breakdown from classified copies.
    ///
    /// Weapons whose bucket isn't in the bucket table are logged and left out
    /// of the details; their copies don't score.
    pub fn aggregate(&self, ownership: &Ownership) -> ScoreBreakdown {
        let bucket_details: Vec<BucketDetail> = self
            .buckets
            .buckets()
            .iter()
            .map(|bucket| {
                let copies = ownership.copies(bucket.name());
                let score = score_bucket(bucket, copies.iter().map(QualifyingCopy::rank));
                BucketDetail {
                    name: bucket.name().to_owned(),
                    total_options: self.weapons.count_in_bucket(bucket.name()),
                    obtained_count: score.copies,
                    max_points: bucket.max_points(),
                    current_points: score.total(),
                    additional_count: score.additional_count,
                    additional_points: score.additional_points,
                }
            })
            .collect();

        let mut candidates = Vec::new();
        let mut weapon_details = Vec::with_capacity(self.weapons.weapons().len());
        for weapon in self.weapons.weapons() {
            let Some(bucket) = self.buckets.bucket_by_name(weapon.bucket()) else {
                warn!(
                    "weapon '{}' references unknown bucket '{}'; leaving it out",
                    weapon.name(),
                    weapon.bucket()
                );
                continue;
            };

            let bucket_copies = ownership.copies(bucket.name());
            let owned: Vec<&QualifyingCopy> = ownership.copies_of(weapon).collect();
            let points = if owned.is_empty() {
                let points = estimate(weapon, &bucket, bucket_copies, &self.weights);
                candidates.push((weapon.clone(), points));
                points
            } else {
                contribution(weapon, &bucket, bucket_copies, &self.weights)
            };

            weapon_details.push(self.weapon_detail(weapon, &owned, points));
        }

        let next_important_weapon =
            recommend(candidates).map(|(weapon, points)| self.next_weapon(&weapon, points));

        ScoreBreakdown {
            inventory_rating: InventoryRating {
                total_points: bucket_details.iter().map(|detail| detail.current_points).sum(),
                max_possible_points: self.buckets.max_possible_points(),
                weekly_change: None,
            },
            next_important_weapon,
            weapon_details,
            bucket_details,
        }
    }

    fn icon_url(&self, weapon: &WeaponRecord) -> Option<String> {
        weapon.display().icon().map(|path| {
            if path.starts_with("http") {
                path.to_owned()
            } else {
                format!("{}{}", self.icon_host, path)
            }
        })
    }

    fn weapon_type(weapon: &WeaponRecord) -> String {
        weapon
            .display()
            .item_type()
            .unwrap_or(UNKNOWN_WEAPON_TYPE)
            .to_owned()
    }

    fn weapon_detail(&self, weapon: &WeaponRecord, owned: &[&QualifyingCopy], points: f64) -> WeaponDetail {
        let perks = weapon
            .desired_perks()
            .iter()
            .filter_map(|perk| {
                let weight = self.weights.weight(perk)?;
                let obtained = self.perks.hashes_for(perk).is_some_and(|hashes| {
                    owned
                        .iter()
                        .flat_map(|copy| copy.matched_perks())
                        .any(|hash| hashes.contains(hash))
                });
                Some(PerkDetail {
                    name: perk.clone(),
                    obtained,
                    description: self.perks.description_for(perk).map(str::to_owned),
                    weight,
                })
            })
            .collect();

        WeaponDetail {
            weapon_name: weapon.name().to_owned(),
            icon: self.icon_url(weapon),
            weapon_type: Self::weapon_type(weapon),
            weapon_bucket: weapon.bucket().to_owned(),
            rank: weapon.rank(),
            points,
            perks,
            recommended_perks: self.perks.recommended_perk_names(weapon.desired_perks()),
            obtained: !owned.is_empty(),
            copies: owned.len(),
            description: weapon.display().description().to_owned(),
            source: weapon.display().source().to_owned(),
        }
    }

    fn next_weapon(&self, weapon: &WeaponRecord, points: f64) -> NextWeapon {
        NextWeapon {
            name: weapon.name().to_owned(),
            icon: self.icon_url(weapon),
            weapon_type: Self::weapon_type(weapon),
            weapon_bucket: weapon.bucket().to_owned(),
            description: weapon.display().description().to_owned(),
            source: weapon.display().source().to_owned(),
            points,
        }
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;

    use super::*;
    use crate::catalog::build_weapon_catalog;
    use crate::catalog::types::{Bucket, WeaponDefinition};
    use crate::manifest::GeneratedCatalog;
    use crate::manifest::test::sample_manifest;
    use crate::rating::classify::test::{owned, plugs};

    fn definition(name: &str, bucket: &str, rank: i64, perks: &[&str]) -> WeaponDefinition {
        WeaponDefinition {
            weapon_name: name.to_owned(),
            desired_perks: perks.iter().map(|perk| perk.to_string()).collect(),
            description: format!("{name} is good"),
            source: "World drop".to_owned(),
            bucket: bucket.to_owned(),
            rank,
        }
    }

    fn engine() -> RatingEngine {
        let definitions = vec![
            definition("Apex Predator", "DPS Rocket", 1, &["Bait and Switch", "Lasting Impression"]),
            definition("Cold Comfort", "DPS Rocket", 3, &["Bait and Switch", "Envious Assassin"]),
            definition("Orphan", "Nowhere", 1, &[]),
        ];
        let generated = GeneratedCatalog::generate(&definitions, &sample_manifest());
        let weapons = build_weapon_catalog(&definitions, &generated.weapons).unwrap();
        let buckets = BucketCatalog::from([
            Bucket::builder()
                .name("DPS Rocket")
                .max_points(10.0)
                .additional_points(1.0)
                .diminishing_factor(0.5)
                .build(),
            Bucket::builder()
                .name("Glaive")
                .max_points(5.0)
                .additional_points(0.5)
                .diminishing_factor(0.5)
                .build(),
        ]);
        let weights = [("Bait and Switch".to_owned(), 0.5)].into_iter().collect();

        RatingEngine::new(buckets, weapons, generated.perks, weights)
    }

    #[test]
    fn empty_inventory_recommends_the_top_pick() {
        let engine = engine();
        let breakdown = engine.rate(&InventorySnapshot::default());

        assert_eq!(breakdown.total_points(), 0.0);
        assert_relative_eq!(breakdown.max_possible_points(), 22.5);
        assert_eq!(breakdown.inventory_rating.weekly_change, None);

        let next = breakdown.next_important_weapon.unwrap();
        assert_eq!(next.name, "Apex Predator");
        assert_relative_eq!(next.points, 10.5);
        assert_eq!(next.icon.as_deref(), Some("https://www.bungie.net/icons/1000.jpg"));
        assert_eq!(next.weapon_type, "Rocket Launcher");
    }

    #[test]
    fn scores_owned_copy_and_estimates_the_rest() {
        let engine = engine().with_icon_host("https://cdn.example");
        let snapshot = InventorySnapshot::new(
            [owned(2000, "c"), owned(1000, "a")],
            plugs(&[("c", &[501, 504]), ("a", &[500, 503])]),
        );
        let breakdown = engine.rate(&snapshot);

        assert_relative_eq!(breakdown.total_points(), 6.0, epsilon = 1e-12);

        let cold_comfort = breakdown.weapon("Cold Comfort").unwrap();
        assert!(cold_comfort.obtained);
        assert_eq!(cold_comfort.copies, 1);
        assert_relative_eq!(cold_comfort.points, 6.5, epsilon = 1e-12);
        assert_eq!(
            cold_comfort.perks,
            vec![PerkDetail {
                name: "Bait and Switch".to_owned(),
                obtained: true,
                description: Some("Bait and Switch description".to_owned()),
                weight: 0.5,
            }]
        );
        assert_eq!(
            cold_comfort.recommended_perks,
            vec!["Bait and Switch", "Envious Assassin"]
        );

        let apex = breakdown.weapon("Apex Predator").unwrap();
        assert!(!apex.obtained);
        assert_relative_eq!(apex.points, 5.5, epsilon = 1e-12);
        assert_eq!(apex.icon.as_deref(), Some("https://cdn.example/icons/1000.jpg"));

        let next = breakdown.next_important_weapon.as_ref().unwrap();
        assert_eq!(next.name, "Apex Predator");

        let rockets = breakdown.bucket("DPS Rocket").unwrap();
        assert_eq!(rockets.total_options, 2);
        assert_eq!(rockets.obtained_count, 1);
        assert_eq!(rockets.additional_count, 0);
        assert_relative_eq!(rockets.current_points, 6.0, epsilon = 1e-12);
        assert_eq!(breakdown.bucket("Glaive").unwrap().total_options, 0);
    }

    #[test]
    fn every_qualifying_copy_counts_as_obtained() {
        let snapshot = InventorySnapshot::new(
            [owned(1000, "a"), owned(1001, "b")],
            plugs(&[("a", &[500, 502]), ("b", &[501, 502])]),
        );
        let breakdown = engine().rate(&snapshot);

        let rockets = breakdown.bucket("DPS Rocket").unwrap();
        assert_eq!(rockets.obtained_count, 2);
        assert_eq!(rockets.additional_count, 1);
        assert_relative_eq!(rockets.current_points, 11.0, epsilon = 1e-12);
        assert_eq!(breakdown.weapon("Apex Predator").unwrap().copies, 2);
    }

    #[test]
    fn unknown_bucket_is_left_out_of_details() {
        let breakdown = engine().rate(&InventorySnapshot::default());

        assert!(breakdown.weapon("Orphan").is_none());
        assert_eq!(breakdown.weapon_details.len(), 2);
        assert_eq!(breakdown.bucket_details.len(), 2);
    }
}
