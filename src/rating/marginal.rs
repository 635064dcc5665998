//! Per-weapon values derived from the bucket scorer.
//!
//! Both figures are differences between two [`score_bucket`] calls: an
//! unobtained weapon is worth what one more copy at its rank would add, an
//! obtained weapon is worth what losing all of its copies would cost.

use std::iter;

use crate::Rc;
use crate::catalog::types::{Bucket, PerkWeights, WeaponRecord};

use super::bucket::score_bucket;
use super::classify::QualifyingCopy;

/// Points a first qualifying copy of a weapon with `rank` would add to a
/// bucket currently holding `copies`. Never negative.
pub fn marginal_value(bucket: &Bucket, copies: &[QualifyingCopy], rank: u32) -> f64 {
    let ranks = || copies.iter().map(QualifyingCopy::rank);
    let current = score_bucket(bucket, ranks()).total();
    let with_copy = score_bucket(bucket, ranks().chain(iter::once(rank))).total();
    (with_copy - current).max(0.0)
}

/// Estimated value of acquiring an unobtained weapon, perk bonus included.
pub fn estimate(
    weapon: &WeaponRecord,
    bucket: &Bucket,
    copies: &[QualifyingCopy],
    weights: &PerkWeights,
) -> f64 {
    marginal_value(bucket, copies, weapon.rank()) + weights.bonus_for(weapon.desired_perks())
}

/// What an obtained weapon's copies add to its bucket, perk bonus included.
pub fn contribution(
    weapon: &WeaponRecord,
    bucket: &Bucket,
    copies: &[QualifyingCopy],
    weights: &PerkWeights,
) -> f64 {
    let with = score_bucket(bucket, copies.iter().map(QualifyingCopy::rank)).total();
    let without = score_bucket(
        bucket,
        copies
            .iter()
            .filter(|copy| copy.weapon().name() != weapon.name())
            .map(QualifyingCopy::rank),
    )
    .total();
    (with - without).max(0.0) + weights.bonus_for(weapon.desired_perks())
}

/// Pick the highest estimate. Equal estimates go to the name that sorts first.
pub fn recommend(
    candidates: impl IntoIterator<Item = (Rc<WeaponRecord>, f64)>,
) -> Option<(Rc<WeaponRecord>, f64)> {
    candidates.into_iter().max_by(|(a, a_points), (b, b_points)| {
        a_points
            .total_cmp(b_points)
            .then_with(|| b.name().cmp(a.name()))
    })
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use approx::assert_relative_eq;

    use super::*;
    use crate::catalog::types::{CatalogProvider, ItemHash, WeaponCatalog};
    use crate::inventory::InventorySnapshot;
    use crate::perks::DesiredPerkSets;
    use crate::rating::classify::classify;
    use crate::rating::classify::test::{owned, plugs};

    fn bucket() -> Bucket {
        Bucket::builder()
            .name("DPS Rocket")
            .max_points(10.0)
            .additional_points(1.0)
            .diminishing_factor(0.5)
            .build()
    }

    fn weapon(name: &str, rank: u32, hash: u32, perks: &[&str]) -> WeaponRecord {
        WeaponRecord::builder()
            .name(name)
            .bucket("DPS Rocket")
            .rank(rank)
            .desired_perks(perks.iter().map(|perk| perk.to_string()).collect())
            .item_hashes(vec![ItemHash::new(hash)])
            .build()
    }

    /// Owns one copy of a rank 3 weapon; a rank 1 weapon is still missing.
    fn fixture() -> (WeaponCatalog, Vec<QualifyingCopy>) {
        let catalog = WeaponCatalog::from([
            weapon("Apex Predator", 1, 1000, &["Bait and Switch"]),
            weapon("Hothead", 3, 3000, &[]),
            weapon("Two-Tailed Fox", 3, 4000, &[]),
        ]);
        let desired: DesiredPerkSets = catalog
            .weapons()
            .iter()
            .map(|weapon| {
                let wanted: HashSet<ItemHash> = [ItemHash::new(500), ItemHash::new(502)].into();
                (weapon.name().to_owned(), wanted)
            })
            .collect();
        let snapshot = InventorySnapshot::new([owned(3000, "h")], plugs(&[("h", &[500, 502])]));

        let copies = classify(&snapshot, &catalog, &desired)
            .copies("DPS Rocket")
            .to_vec();
        (catalog, copies)
    }

    #[test]
    fn better_ranked_weapon_takes_the_top_slot() {
        let (catalog, copies) = fixture();
        let apex = catalog.weapon_by_name("Apex Predator").unwrap();

        assert_relative_eq!(marginal_value(&bucket(), &copies, apex.rank()), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn worse_ranked_weapon_is_worth_a_dupe_slot() {
        let (_, copies) = fixture();
        assert_relative_eq!(marginal_value(&bucket(), &copies, 5), 1.0);
        assert_relative_eq!(marginal_value(&bucket(), &[], 6), 0.0);
    }

    #[test]
    fn perk_bonus_is_added_unconditionally() {
        let (catalog, copies) = fixture();
        let apex = catalog.weapon_by_name("Apex Predator").unwrap();
        let weights: PerkWeights = [("Bait and Switch".to_owned(), 0.5)].into_iter().collect();

        assert_relative_eq!(estimate(&apex, &bucket(), &copies, &weights), 5.5, epsilon = 1e-12);
    }

    #[test]
    fn contribution_is_the_cost_of_losing_the_weapon() {
        let (catalog, copies) = fixture();
        let hothead = catalog.weapon_by_name("Hothead").unwrap();
        let weights = PerkWeights::default();

        assert_relative_eq!(
            contribution(&hothead, &bucket(), &copies, &weights),
            6.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn ties_go_to_the_first_name() {
        let (catalog, _) = fixture();
        let fox = catalog.weapon_by_name("Two-Tailed Fox").unwrap();
        let hothead = catalog.weapon_by_name("Hothead").unwrap();

        let (picked, points) = recommend([(fox.clone(), 1.0), (hothead.clone(), 1.0)]).unwrap();
        assert_eq!(picked.name(), "Hothead");
        assert_eq!(points, 1.0);

        let (picked, _) = recommend([(hothead, 1.0), (fox, 2.0)]).unwrap();
        assert_eq!(picked.name(), "Two-Tailed Fox");
        assert!(recommend(Vec::<(Rc<WeaponRecord>, f64)>::new()).is_none());
    }
}
