//! Resolution between the perk names curators write and the plug hashes the
//! API reports on item instances.
//!
//! A perk and its "Enhanced " counterpart fold onto one canonical key, so a
//! curated "Rampage" matches either plug on a rolled weapon.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::keys::{
    ENHANCED_PREFIX_NORMALIZED, canonical_perk_key, normalize_name, strip_enhanced,
};
use crate::catalog::types::{CatalogProvider, ItemHash, WeaponDefinition};
use crate::manifest::ManifestTables;

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerkIndex {
    /// Canonical perk key -> every plug hash carrying that perk (base and enhanced).
    name_to_hashes: BTreeMap<String, BTreeSet<ItemHash>>,
    /// Plug hash -> manifest display name, "Enhanced " prefix included.
    hash_to_name: BTreeMap<ItemHash, String>,
    /// Canonical perk key -> manifest description of the perk.
    #[serde(default)]
    descriptions: BTreeMap<String, String>,
}

impl PerkIndex {
    /// Index the desired perks of every definition against the plugs the
    /// resolved weapons can actually roll.
    ///
    /// Desired perks that no weapon can roll are dropped with a warning rather
    /// than failing the build.
    pub fn build(
        definitions: &[WeaponDefinition],
        possible_perks: &BTreeMap<ItemHash, Vec<ItemHash>>,
        manifest: &ManifestTables,
    ) -> Self {
        let desired: BTreeSet<String> = definitions
            .iter()
            .flat_map(|definition| definition.desired_perks.iter())
            .map(|perk| canonical_perk_key(perk))
            .filter(|key| !key.is_empty())
            .collect();

        let mut index = PerkIndex::default();
        let candidates = possible_perks.values().flatten().copied().unique();
        for plug_hash in candidates {
            let Some(plug) = manifest.item(plug_hash) else {
                continue;
            };
            let key = canonical_perk_key(plug.name());
            if key.is_empty() || !desired.contains(&key) {
                continue;
            }

            index
                .name_to_hashes
                .entry(key.clone())
                .or_default()
                .insert(plug_hash);
            index
                .hash_to_name
                .insert(plug_hash, plug.name().trim().to_owned());

            // Prefer the base perk's description over the enhanced one.
            let description = plug.display_properties.description.trim();
            let is_base = !normalize_name(plug.name()).starts_with(ENHANCED_PREFIX_NORMALIZED);
            if !description.is_empty() && (is_base || !index.descriptions.contains_key(&key)) {
                index.descriptions.insert(key, description.to_owned());
            }
        }

        for key in desired.iter().filter(|key| !index.name_to_hashes.contains_key(*key)) {
            warn!("desired perk '{key}' not found on any resolved weapon; dropping it");
        }

        debug!(
            "perk index built: {} perks, {} plug hashes",
            index.name_to_hashes.len(),
            index.hash_to_name.len()
        );

        index
    }

    /// Plug hashes for a perk name, in any casing, with or without "Enhanced ".
    pub fn hashes_for(&self, perk: &str) -> Option<&BTreeSet<ItemHash>> {
        self.name_to_hashes.get(&canonical_perk_key(perk))
    }

    /// Manifest display name of a plug.
    pub fn name_of(&self, hash: ItemHash) -> Option<&str> {
        self.hash_to_name.get(&hash).map(String::as_str)
    }

    pub fn description_for(&self, perk: &str) -> Option<&str> {
        self.descriptions
            .get(&canonical_perk_key(perk))
            .map(String::as_str)
    }

    /// Number of distinct perks indexed.
    pub fn len(&self) -> usize {
        self.name_to_hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_to_hashes.is_empty()
    }

    /// Union of the plug hashes for a wish list. Unresolvable names contribute nothing.
    pub fn desired_hashes(&self, perks: &[String]) -> HashSet<ItemHash> {
        perks
            .iter()
            .filter_map(|perk| {
                let hashes = self.hashes_for(perk);
                if hashes.is_none() {
                    debug!("perk '{perk}' has no known plug hashes");
                }
                hashes
            })
            .flatten()
            .copied()
            .collect()
    }

    /// Display names for a wish list, with enhanced variants folded onto the
    /// base name and duplicates removed, in wish-list order.
    pub fn recommended_perk_names(&self, perks: &[String]) -> Vec<String> {
        perks
            .iter()
            .filter_map(|perk| self.hashes_for(perk))
            .flatten()
            .filter_map(|hash| self.name_of(*hash))
            .map(strip_enhanced)
            .unique()
            .collect()
    }
}

/// Desired plug hashes for every curated weapon, resolved once per engine.
#[derive(Debug, Clone, Default)]
pub struct DesiredPerkSets(HashMap<String, HashSet<ItemHash>>);

impl DesiredPerkSets {
    pub fn build(catalog: &impl CatalogProvider, index: &PerkIndex) -> Self {
        DesiredPerkSets(
            catalog
                .weapons()
                .iter()
                .map(|weapon| {
                    let hashes = index.desired_hashes(weapon.desired_perks());
                    if hashes.is_empty() {
                        warn!(
                            "no desired perks resolved for weapon '{}'; no copy of it can qualify",
                            weapon.name()
                        );
                    }
                    (weapon.name().to_owned(), hashes)
                })
                .collect(),
        )
    }

    pub fn for_weapon(&self, weapon: &str) -> Option<&HashSet<ItemHash>> {
        self.0.get(weapon)
    }
}

impl FromIterator<(String, HashSet<ItemHash>)> for DesiredPerkSets {
    fn from_iter<T: IntoIterator<Item = (String, HashSet<ItemHash>)>>(iter: T) -> Self {
        DesiredPerkSets(iter.into_iter().collect())
    }
}
