//! Bungie manifest tables and the one-off resolution of curated weapons
//! against them.
//!
//! The manifest is large, so `vaultscore generate` resolves everything once
//! into a [`GeneratedCatalog`]. Scoring only ever reads that smaller file.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Read;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::keys::normalize_name;
use crate::catalog::types::{ItemHash, WeaponDefinition};
use crate::error::IResult;
use crate::perks::PerkIndex;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayProperties {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketEntry {
    #[serde(default)]
    pub single_initial_item_hash: ItemHash,
    #[serde(default)]
    pub reusable_plug_set_hash: ItemHash,
    #[serde(default)]
    pub randomized_plug_set_hash: ItemHash,
}

impl SocketEntry {
    /// Random rolls live in the randomized plug set; fixed-roll weapons only
    /// have a reusable one.
    pub fn plug_set(&self) -> Option<ItemHash> {
        [self.randomized_plug_set_hash, self.reusable_plug_set_hash]
            .into_iter()
            .find(|hash| !hash.is_unset())
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSocketBlock {
    #[serde(default)]
    pub socket_entries: Vec<SocketEntry>,
}

/// A `DestinyInventoryItemDefinition`, reduced to the fields rating needs.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDefinition {
    pub hash: ItemHash,
    #[serde(default)]
    pub display_properties: DisplayProperties,
    #[serde(default)]
    pub item_type_display_name: String,
    #[serde(default)]
    pub redacted: bool,
    #[serde(default)]
    pub sockets: Option<ItemSocketBlock>,
}

impl ItemDefinition {
    pub fn name(&self) -> &str {
        &self.display_properties.name
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlugItem {
    pub plug_item_hash: ItemHash,
}

/// A `DestinyPlugSetDefinition`: the pool a socket can roll from.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlugSetDefinition {
    #[serde(default)]
    pub reusable_plug_items: Vec<PlugItem>,
}

/// The two manifest tables needed to resolve weapons and perks.
#[derive(Debug, Default)]
pub struct ManifestTables {
    items: HashMap<ItemHash, ItemDefinition>,
    plug_sets: HashMap<ItemHash, PlugSetDefinition>,
}

impl ManifestTables {
    pub fn new(
        items: HashMap<ItemHash, ItemDefinition>,
        plug_sets: HashMap<ItemHash, PlugSetDefinition>,
    ) -> Self {
        ManifestTables { items, plug_sets }
    }

    /// Read the item and plug set tables as exported by the manifest
    /// (`{"<hash>": {...}, ...}` objects).
    pub fn from_readers<I: Read, P: Read>(items: I, plug_sets: P) -> IResult<Self> {
        let items: HashMap<ItemHash, ItemDefinition> = serde_json::from_reader(items)?;
        let plug_sets: HashMap<ItemHash, PlugSetDefinition> = serde_json::from_reader(plug_sets)?;
        debug!(
            "manifest loaded: {} items, {} plug sets",
            items.len(),
            plug_sets.len()
        );
        Ok(Self::new(items, plug_sets))
    }

    pub fn item(&self, hash: ItemHash) -> Option<&ItemDefinition> {
        self.items.get(&hash)
    }

    pub fn plug_set(&self, hash: ItemHash) -> Option<&PlugSetDefinition> {
        self.plug_sets.get(&hash)
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.items.values()
    }

    /// Every plug a weapon item can roll, across all of its sockets.
    pub fn possible_perks(&self, weapon_hash: ItemHash) -> BTreeSet<ItemHash> {
        let Some(sockets) = self
            .item(weapon_hash)
            .and_then(|item| item.sockets.as_ref())
        else {
            return BTreeSet::new();
        };

        sockets
            .socket_entries
            .iter()
            .filter_map(SocketEntry::plug_set)
            .filter_map(|plug_set| self.plug_set(plug_set))
            .flat_map(|plug_set| plug_set.reusable_plug_items.iter())
            .map(|plug| plug.plug_item_hash)
            .collect()
    }
}

/// A curated weapon as found in the manifest.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedWeapon {
    pub name: String,
    /// Every non-redacted item sharing the weapon's display name, ascending.
    pub item_hashes: Vec<ItemHash>,
    pub item_type: Option<String>,
    pub icon: Option<String>,
}

/// Find every item hash whose display name matches a curated weapon.
///
/// Matching is case-insensitive and ignores surrounding whitespace, which
/// picks up adept and reissued copies sharing a name. Display data is taken
/// from the lowest matching hash so the output is stable.
pub fn resolve_weapons(
    definitions: &[WeaponDefinition],
    manifest: &ManifestTables,
) -> Vec<ResolvedWeapon> {
    let wanted: HashMap<String, &str> = definitions
        .iter()
        .map(|definition| {
            (
                normalize_name(&definition.weapon_name),
                definition.weapon_name.as_str(),
            )
        })
        .collect();

    let mut matches: HashMap<&str, Vec<&ItemDefinition>> = HashMap::new();
    for item in manifest.items().filter(|item| !item.redacted) {
        if let Some(name) = wanted.get(&normalize_name(item.name())) {
            matches.entry(*name).or_default().push(item);
        }
    }

    definitions
        .iter()
        .map(|definition| {
            let mut items = matches
                .remove(definition.weapon_name.as_str())
                .unwrap_or_default();
            items.sort_by_key(|item| item.hash);

            if items.is_empty() {
                warn!(
                    "no manifest items found for weapon '{}'",
                    definition.weapon_name
                );
            }

            let first = items.first();
            ResolvedWeapon {
                name: definition.weapon_name.clone(),
                item_hashes: items.iter().map(|item| item.hash).collect(),
                item_type: first
                    .map(|item| item.item_type_display_name.clone())
                    .filter(|item_type| !item_type.is_empty()),
                icon: first
                    .and_then(|item| item.display_properties.icon.clone())
                    .filter(|icon| !icon.is_empty()),
            }
        })
        .collect()
}

/// Everything scoring needs from the manifest, small enough to ship alongside
/// the weapon list.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCatalog {
    pub weapons: Vec<ResolvedWeapon>,
    pub perks: PerkIndex,
    /// Weapon item hash -> every perk plug it can roll.
    pub possible_perks: BTreeMap<ItemHash, Vec<ItemHash>>,
}

impl GeneratedCatalog {
    pub fn generate(definitions: &[WeaponDefinition], manifest: &ManifestTables) -> Self {
        let weapons = resolve_weapons(definitions, manifest);

        let possible_perks: BTreeMap<ItemHash, Vec<ItemHash>> = weapons
            .iter()
            .flat_map(|weapon| weapon.item_hashes.iter().copied())
            .unique()
            .map(|hash| (hash, manifest.possible_perks(hash).into_iter().collect()))
            .collect();

        let perks = PerkIndex::build(definitions, &possible_perks, manifest);

        info!(
            "generated catalog: {}/{} weapons resolved, {} perks indexed",
            weapons
                .iter()
                .filter(|weapon| !weapon.item_hashes.is_empty())
                .count(),
            weapons.len(),
            perks.len()
        );

        GeneratedCatalog {
            weapons,
            perks,
            possible_perks,
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> IResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}
