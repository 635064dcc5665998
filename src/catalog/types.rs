use std::collections::HashMap;
use std::fmt;

use bon::Builder;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::Rc;

use super::keys::NORMALIZED_ADDITIONAL_COPIES;

/// A Bungie manifest hash. Used for weapon items, perk plugs and plug sets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemHash(u32);

impl ItemHash {
    pub const fn new(raw: u32) -> Self {
        ItemHash(raw)
    }

    /// The manifest uses `0` for "no hash".
    pub fn is_unset(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ItemHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u32> for ItemHash {
    fn from(v: u32) -> Self {
        ItemHash(v)
    }
}

/// A scoring role (e.g. "DPS Rocket") with its point budget and dupe-bonus parameters.
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    #[serde(alias = "bucketName")]
    #[builder(into)]
    name: String,
    max_points: f64,
    #[serde(alias = "additionalWeaponPts")]
    additional_points: f64,
    diminishing_factor: f64,
}

impl Bucket {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_points(&self) -> f64 {
        self.max_points
    }

    pub fn additional_points(&self) -> f64 {
        self.additional_points
    }

    pub fn diminishing_factor(&self) -> f64 {
        self.diminishing_factor
    }

    /// Normalization ceiling for this bucket: `maxPoints + additionalPoints * 5`.
    pub fn max_possible_points(&self) -> f64 {
        self.max_points + self.additional_points * NORMALIZED_ADDITIONAL_COPIES
    }
}

/// One entry of the curated weapon list, as written by hand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponDefinition {
    pub weapon_name: String,
    #[serde(default)]
    pub desired_perks: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(deserialize_with = "rank_from_number_or_string")]
    pub rank: i64,
}

/// The hand-written list stores ranks as strings ("1"); accept plain numbers too.
fn rank_from_number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawRank {
        Number(i64),
        Text(String),
    }

    match RawRank::deserialize(deserializer)? {
        RawRank::Number(rank) => Ok(rank),
        RawRank::Text(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid rank '{text}'"))),
    }
}

/// Display metadata attached to a weapon. Type and icon come from the manifest.
#[derive(Builder, Clone, Debug, Default, PartialEq)]
pub struct WeaponDisplay {
    #[builder(default, into)]
    description: String,
    #[builder(default, into)]
    source: String,
    item_type: Option<String>,
    icon: Option<String>,
}

impl WeaponDisplay {
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn item_type(&self) -> Option<&str> {
        self.item_type.as_deref()
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }
}

/// A validated curated weapon together with every item hash it is known by
/// (normal, adept, reissued, ...).
#[derive(Builder, Clone, Debug, PartialEq)]
pub struct WeaponRecord {
    #[builder(into)]
    name: String,
    #[builder(into)]
    bucket: String,
    rank: u32,
    #[builder(default)]
    desired_perks: Vec<String>,
    #[builder(default)]
    display: WeaponDisplay,
    #[builder(default)]
    item_hashes: Vec<ItemHash>,
}

impl WeaponRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Curated priority within the bucket; 1 is the weapon to own first.
    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub fn desired_perks(&self) -> &[String] {
        &self.desired_perks
    }

    pub fn display(&self) -> &WeaponDisplay {
        &self.display
    }

    pub fn item_hashes(&self) -> &[ItemHash] {
        &self.item_hashes
    }
}

pub trait CatalogProvider {
    fn weapon_by_name(&self, name: &str) -> Option<Rc<WeaponRecord>>;
    fn weapon_by_item_hash(&self, hash: ItemHash) -> Option<Rc<WeaponRecord>>;
    fn weapons(&self) -> &[Rc<WeaponRecord>];
}

/// Ordered bucket table. Iteration order is the order buckets were declared.
#[derive(Debug, Clone)]
pub struct BucketCatalog {
    buckets: Vec<Rc<Bucket>>,
    name_to_bucket: HashMap<String, Rc<Bucket>>,
}

impl BucketCatalog {
    pub fn bucket_by_name(&self, name: &str) -> Option<Rc<Bucket>> {
        self.name_to_bucket.get(name).cloned()
    }

    pub fn buckets(&self) -> &[Rc<Bucket>] {
        self.buckets.as_slice()
    }

    /// Sum of every bucket's normalization ceiling.
    pub fn max_possible_points(&self) -> f64 {
        self.buckets.iter().map(|bucket| bucket.max_possible_points()).sum()
    }
}

impl<I> From<I> for BucketCatalog
where
    I: IntoIterator<Item = Bucket>,
{
    /// Callers are expected to have rejected duplicate names already; the first
    /// declaration wins otherwise.
    fn from(value: I) -> Self {
        let buckets: Vec<Rc<Bucket>> = value.into_iter().map(Rc::new).collect();
        let mut name_to_bucket = HashMap::with_capacity(buckets.len());
        for bucket in &buckets {
            name_to_bucket
                .entry(bucket.name().to_owned())
                .or_insert_with(|| bucket.clone());
        }

        Self {
            buckets,
            name_to_bucket,
        }
    }
}

/// Curated weapons with name and item-hash lookups.
#[derive(Debug, Clone)]
pub struct WeaponCatalog {
    weapons: Vec<Rc<WeaponRecord>>,
    name_to_weapon: HashMap<String, Rc<WeaponRecord>>,
    hash_to_weapon: HashMap<ItemHash, Rc<WeaponRecord>>,
}

impl CatalogProvider for WeaponCatalog {
    fn weapon_by_name(&self, name: &str) -> Option<Rc<WeaponRecord>> {
        self.name_to_weapon.get(name).cloned()
    }

    fn weapon_by_item_hash(&self, hash: ItemHash) -> Option<Rc<WeaponRecord>> {
        self.hash_to_weapon.get(&hash).cloned()
    }

    fn weapons(&self) -> &[Rc<WeaponRecord>] {
        self.weapons.as_slice()
    }
}

impl WeaponCatalog {
    /// Number of curated weapons assigned to `bucket`.
    pub fn count_in_bucket(&self, bucket: &str) -> usize {
        self.weapons
            .iter()
            .filter(|weapon| weapon.bucket() == bucket)
            .count()
    }
}

struct WeaponLookups {
    by_name: HashMap<String, Rc<WeaponRecord>>,
    by_hash: HashMap<ItemHash, Rc<WeaponRecord>>,
}

fn build_weapon_lookups(weapons: &[Rc<WeaponRecord>]) -> WeaponLookups {
    let mut by_name = HashMap::with_capacity(weapons.len());
    let mut by_hash: HashMap<ItemHash, Rc<WeaponRecord>> = HashMap::new();
    for weapon in weapons {
        by_name.insert(weapon.name().to_owned(), weapon.clone());
        for hash in weapon.item_hashes() {
            if let Some(existing) = by_hash.get(hash) {
                warn!(
                    "item hash {hash} claimed by both '{}' and '{}'; keeping '{}'",
                    existing.name(),
                    weapon.name(),
                    existing.name()
                );
                continue;
            }
            by_hash.insert(*hash, weapon.clone());
        }
    }

    WeaponLookups { by_name, by_hash }
}

impl<I> From<I> for WeaponCatalog
where
    I: IntoIterator<Item = WeaponRecord>,
{
    fn from(value: I) -> Self {
        let weapons: Vec<Rc<WeaponRecord>> = value.into_iter().map(Rc::new).collect();
        let lookups = build_weapon_lookups(weapons.as_ref());

        Self {
            weapons,
            name_to_weapon: lookups.by_name,
            hash_to_weapon: lookups.by_hash,
        }
    }
}

/// Flat bonus per desired perk name. Names missing from the table add nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerkWeights(HashMap<String, f64>);

impl PerkWeights {
    pub fn weight(&self, perk: &str) -> Option<f64> {
        self.0.get(perk).copied()
    }

    /// Bonus for a weapon's wish list. Applied from the list alone, whether or
    /// not any copy actually rolled those perks.
    pub fn bonus_for(&self, perks: &[String]) -> f64 {
        perks
            .iter()
            .filter_map(|perk| self.weight(perk))
            .map(|weight| weight.max(0.0))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for PerkWeights {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        PerkWeights(iter.into_iter().collect())
    }
}
