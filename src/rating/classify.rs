use std::collections::HashMap;

use itertools::Itertools;
use tracing::debug;

use crate::Rc;
use crate::catalog::keys::MIN_MATCHING_PERKS;
use crate::catalog::types::{CatalogProvider, ItemHash, WeaponRecord};
use crate::inventory::InventorySnapshot;
use crate::perks::DesiredPerkSets;

/// An owned instance whose installed perks hit at least two entries of its
/// weapon's wish list.
#[derive(Clone, Debug)]
pub struct QualifyingCopy {
    weapon: Rc<WeaponRecord>,
    instance_id: String,
    matched_perks: Vec<ItemHash>,
}

impl QualifyingCopy {
    pub fn weapon(&self) -> &Rc<WeaponRecord> {
        &self.weapon
    }

    pub fn rank(&self) -> u32 {
        self.weapon.rank()
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Installed plugs that are on the wish list, ascending.
    pub fn matched_perks(&self) -> &[ItemHash] {
        &self.matched_perks
    }
}

/// Qualifying copies grouped by bucket name, each group ordered by rank.
#[derive(Clone, Debug, Default)]
pub struct Ownership {
    by_bucket: HashMap<String, Vec<QualifyingCopy>>,
}

impl Ownership {
    /// Copies in a bucket, best rank first. Empty for buckets with no copies.
    pub fn copies(&self, bucket: &str) -> &[QualifyingCopy] {
        self.by_bucket.get(bucket).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn copies_of<'a>(&'a self, weapon: &'a WeaponRecord) -> impl Iterator<Item = &'a QualifyingCopy> {
        self.copies(weapon.bucket())
            .iter()
            .filter(move |copy| copy.weapon.name() == weapon.name())
    }

    pub fn is_obtained(&self, weapon: &WeaponRecord) -> bool {
        self.copies_of(weapon).next().is_some()
    }

    /// Total qualifying copies across all buckets.
    pub fn len(&self) -> usize {
        self.by_bucket.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sort every owned instance into its weapon's bucket if it is built well
/// enough to count.
///
/// Items that aren't curated weapons are skipped. An instance with no socket
/// data in the snapshot is treated as having nothing installed.
pub fn classify(
    snapshot: &InventorySnapshot,
    catalog: &impl CatalogProvider,
    desired: &DesiredPerkSets,
) -> Ownership {
    let mut by_bucket: HashMap<String, Vec<QualifyingCopy>> = HashMap::new();

    for item in snapshot.items() {
        let Some(weapon) = catalog.weapon_by_item_hash(item.item_hash) else {
            continue;
        };

        let installed = snapshot
            .installed_plugs(&item.instance_id)
            .unwrap_or_default();
        let matched_perks: Vec<ItemHash> = match desired.for_weapon(weapon.name()) {
            Some(wanted) => installed
                .iter()
                .filter(|plug| wanted.contains(*plug))
                .copied()
                .sorted()
                .dedup()
                .collect(),
            None => Vec::new(),
        };

        if matched_perks.len() < MIN_MATCHING_PERKS {
            debug!(
                "copy {} of '{}' matches {} desired perks; not counted",
                item.instance_id,
                weapon.name(),
                matched_perks.len()
            );
            continue;
        }

        by_bucket
            .entry(weapon.bucket().to_owned())
            .or_default()
            .push(QualifyingCopy {
                weapon: weapon.clone(),
                instance_id: item.instance_id.clone(),
                matched_perks,
            });
    }

    for copies in by_bucket.values_mut() {
        copies.sort_by(|a, b| {
            a.rank()
                .cmp(&b.rank())
                .then_with(|| a.weapon.name().cmp(b.weapon.name()))
                .then_with(|| a.instance_id.cmp(&b.instance_id))
        });
    }

    let ownership = Ownership { by_bucket };
    debug!("{} qualifying copies found", ownership.len());
    ownership
}
