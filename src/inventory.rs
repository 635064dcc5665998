//! Player inventory snapshots.
//!
//! A snapshot is built fresh for every rating from a Bungie `GetProfile`
//! response and is never cached.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;

use serde::Deserialize;
use tracing::debug;

use crate::catalog::types::ItemHash;
use crate::error::IResult;

/// Bungie wraps every profile component in `{"data": ...}`.
#[derive(Debug, Deserialize)]
struct Component<T> {
    #[serde(default = "Option::default")]
    data: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserInfo {
    #[serde(default)]
    bungie_global_display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileSummary {
    #[serde(default)]
    user_info: UserInfo,
}

#[derive(Debug, Default, Deserialize)]
struct ItemList {
    #[serde(default)]
    items: Vec<InventoryItem>,
}

/// One item as listed in an inventory component.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub item_hash: ItemHash,
    #[serde(default)]
    pub item_instance_id: Option<String>,
    #[serde(default)]
    pub bucket_hash: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Socket {
    #[serde(default)]
    pub plug_hash: Option<ItemHash>,
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub is_visible: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ItemSockets {
    #[serde(default)]
    pub sockets: Vec<Socket>,
}

#[derive(Debug, Default, Deserialize)]
struct ItemComponents {
    #[serde(default)]
    sockets: Option<Component<HashMap<String, ItemSockets>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileData {
    #[serde(default)]
    profile: Option<Component<ProfileSummary>>,
    #[serde(default)]
    profile_inventory: Option<Component<ItemList>>,
    #[serde(default)]
    character_inventories: Option<Component<BTreeMap<String, ItemList>>>,
    #[serde(default)]
    character_equipment: Option<Component<BTreeMap<String, ItemList>>>,
    #[serde(default)]
    item_components: Option<ItemComponents>,
}

/// Top level of a `GetProfile` response.
#[derive(Debug, Deserialize)]
pub struct ProfileResponse {
    #[serde(rename = "Response")]
    response: ProfileData,
}

impl ProfileResponse {
    pub fn from_reader<R: Read>(reader: R) -> IResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// An owned weapon instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedItem {
    pub item_hash: ItemHash,
    pub instance_id: String,
}

/// Every owned instance plus the plugs installed on each of them.
#[derive(Clone, Debug, Default)]
pub struct InventorySnapshot {
    display_name: Option<String>,
    items: Vec<OwnedItem>,
    plugs: HashMap<String, Vec<ItemHash>>,
}

impl InventorySnapshot {
    /// Build a snapshot from already-flattened parts. Duplicate instance ids
    /// keep their first occurrence.
    pub fn new(
        items: impl IntoIterator<Item = OwnedItem>,
        plugs: HashMap<String, Vec<ItemHash>>,
    ) -> Self {
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .filter(|item| {
                let first = seen.insert(item.instance_id.clone());
                if !first {
                    debug!("instance {} listed twice; ignoring repeat", item.instance_id);
                }
                first
            })
            .collect();

        InventorySnapshot {
            display_name: None,
            items,
            plugs,
        }
    }

    /// Merge character inventories, the account-wide vault and equipped items,
    /// in that order. Items without an instance id (consumables, currencies)
    /// can't carry perks and are dropped.
    pub fn from_profile(profile: ProfileResponse) -> Self {
        let data = profile.response;

        let display_name = data
            .profile
            .and_then(|component| component.data)
            .and_then(|summary| summary.user_info.bungie_global_display_name);

        let per_character = |component: Option<Component<BTreeMap<String, ItemList>>>| {
            component
                .and_then(|component| component.data)
                .into_iter()
                .flat_map(|characters| characters.into_values())
                .flat_map(|list| list.items)
        };

        let character_items = per_character(data.character_inventories);
        let vault_items = data
            .profile_inventory
            .and_then(|component| component.data)
            .into_iter()
            .flat_map(|list| list.items);
        let equipped_items = per_character(data.character_equipment);

        let items = character_items
            .chain(vault_items)
            .chain(equipped_items)
            .filter_map(|item| {
                let instance_id = item.item_instance_id?;
                Some(OwnedItem {
                    item_hash: item.item_hash,
                    instance_id,
                })
            });

        let plugs = data
            .item_components
            .and_then(|components| components.sockets)
            .and_then(|component| component.data)
            .unwrap_or_default()
            .into_iter()
            .map(|(instance_id, sockets)| {
                let installed = sockets
                    .sockets
                    .into_iter()
                    .filter_map(|socket| socket.plug_hash)
                    .filter(|hash| !hash.is_unset())
                    .collect();
                (instance_id, installed)
            })
            .collect();

        let mut snapshot = Self::new(items, plugs);
        snapshot.display_name = display_name;
        debug!(
            "snapshot built: {} instanced items, {} with socket data",
            snapshot.items.len(),
            snapshot.plugs.len()
        );
        snapshot
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn items(&self) -> &[OwnedItem] {
        &self.items
    }

    /// Plugs installed on an instance, or `None` when the profile carried no
    /// socket data for it.
    pub fn installed_plugs(&self, instance_id: &str) -> Option<&[ItemHash]> {
        self.plugs.get(instance_id).map(Vec::as_slice)
    }
}
