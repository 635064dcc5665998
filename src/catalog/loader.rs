//! Reading catalog files and turning them into validated lookup tables.
//!
//! Structural problems (an empty name, a rank below 1, a nonsensical bucket
//! parameter) are fatal: scoring against a broken catalog would silently
//! produce wrong numbers. Gaps against the manifest are not; those are logged
//! and the affected weapon simply has no item hashes.

use std::collections::{HashMap, HashSet};
use std::io::Read;

use tracing::{debug, warn};

use crate::catalog::keys::normalize_name;
use crate::error::{ErrorKind, IResult, failure_from_kind};
use crate::manifest::ResolvedWeapon;

use super::types::{
    Bucket, BucketCatalog, PerkWeights, WeaponCatalog, WeaponDefinition, WeaponDisplay,
    WeaponRecord,
};

/// Parse and validate the hand-written weapon list.
pub fn load_weapon_definitions<R: Read>(reader: R) -> IResult<Vec<WeaponDefinition>> {
    let definitions: Vec<WeaponDefinition> = serde_json::from_reader(reader)?;
    validate_weapon_definitions(&definitions)?;
    debug!("loaded {} weapon definitions", definitions.len());
    Ok(definitions)
}

/// Reject definitions the scorer cannot work with.
///
/// Names are compared the way the manifest matches them (trimmed, any case),
/// so two spellings of one weapon are a duplicate.
pub fn validate_weapon_definitions(definitions: &[WeaponDefinition]) -> IResult<()> {
    let mut seen = HashSet::with_capacity(definitions.len());
    for definition in definitions {
        if definition.weapon_name.trim().is_empty() {
            return Err(failure_from_kind(ErrorKind::InvalidWeapon {
                detail: "weapon with empty name found".to_string(),
            }));
        }
        if definition.bucket.trim().is_empty() {
            return Err(failure_from_kind(ErrorKind::InvalidWeapon {
                detail: format!("weapon '{}' has empty bucket", definition.weapon_name),
            }));
        }
        if definition.rank < 1 || definition.rank > i64::from(u32::MAX) {
            return Err(failure_from_kind(ErrorKind::InvalidWeapon {
                detail: format!(
                    "weapon '{}' has invalid rank '{}'",
                    definition.weapon_name, definition.rank
                ),
            }));
        }
        if !seen.insert(normalize_name(&definition.weapon_name)) {
            return Err(failure_from_kind(ErrorKind::DuplicateWeapon {
                name: definition.weapon_name.clone(),
            }));
        }
    }

    Ok(())
}

/// Parse a bucket table (a JSON array of buckets, in display order).
pub fn load_buckets<R: Read>(reader: R) -> IResult<BucketCatalog> {
    let buckets: Vec<Bucket> = serde_json::from_reader(reader)?;
    validate_buckets(buckets.iter())?;
    Ok(BucketCatalog::from(buckets))
}

pub fn validate_buckets<'a>(buckets: impl IntoIterator<Item = &'a Bucket>) -> IResult<()> {
    let mut seen = HashSet::new();
    for bucket in buckets {
        let invalid = |detail: String| failure_from_kind(ErrorKind::InvalidBucket { detail });

        if bucket.name().trim().is_empty() {
            return Err(invalid("bucket with empty name found".to_string()));
        }
        for (field, value) in [
            ("maxPoints", bucket.max_points()),
            ("additionalPoints", bucket.additional_points()),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!(
                    "bucket '{}' has invalid {field} '{value}'",
                    bucket.name()
                )));
            }
        }
        let factor = bucket.diminishing_factor();
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(invalid(format!(
                "bucket '{}' has diminishing factor '{factor}' outside (0, 1]",
                bucket.name()
            )));
        }
        if !seen.insert(bucket.name().to_owned()) {
            return Err(failure_from_kind(ErrorKind::DuplicateBucket {
                name: bucket.name().to_owned(),
            }));
        }
    }

    Ok(())
}

/// Parse a perk name -> flat bonus table.
pub fn load_perk_weights<R: Read>(reader: R) -> IResult<PerkWeights> {
    let weights: PerkWeights = serde_json::from_reader(reader)?;
    Ok(weights)
}

/// Join validated definitions with the hashes and display data resolved from
/// the manifest. Weapons the manifest never matched stay in the catalog so
/// they still show up as unobtained.
pub fn build_weapon_catalog(
    definitions: &[WeaponDefinition],
    resolved: &[ResolvedWeapon],
) -> IResult<WeaponCatalog> {
    validate_weapon_definitions(definitions)?;

    let resolved_by_name: HashMap<&str, &ResolvedWeapon> = resolved
        .iter()
        .map(|weapon| (weapon.name.as_str(), weapon))
        .collect();

    let records = definitions.iter().map(|definition| {
        let resolved = resolved_by_name.get(definition.weapon_name.as_str());
        if resolved.is_none_or(|weapon| weapon.item_hashes.is_empty()) {
            warn!(
                "no item hashes found for weapon '{}'; it can never be obtained",
                definition.weapon_name
            );
        }

        let display = WeaponDisplay::builder()
            .description(definition.description.as_str())
            .source(definition.source.as_str())
            .maybe_item_type(resolved.and_then(|weapon| weapon.item_type.clone()))
            .maybe_icon(resolved.and_then(|weapon| weapon.icon.clone()))
            .build();

        WeaponRecord::builder()
            .name(definition.weapon_name.as_str())
            .bucket(definition.bucket.trim())
            // validated above
            .rank(definition.rank as u32)
            .desired_perks(definition.desired_perks.clone())
            .display(display)
            .item_hashes(
                resolved
                    .map(|weapon| weapon.item_hashes.clone())
                    .unwrap_or_default(),
            )
            .build()
    });

    Ok(WeaponCatalog::from(records))
}
