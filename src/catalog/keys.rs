//! Constants shared between catalog loading, perk resolution and scoring.

/// A copy is "meaningfully built" once this many of its installed perks are
/// on the weapon's wish list.
pub const MIN_MATCHING_PERKS: usize = 2;

/// Fraction of a bucket's `maxPoints` lost for every rank step above 1 when
/// scoring the top copy.
pub const TOP_PICK_RANK_DECAY: f64 = 0.2;

/// Number of additional copies assumed when normalizing a bucket's maximum.
/// This is a fixed constant, not the number of weapons in the bucket.
pub const NORMALIZED_ADDITIONAL_COPIES: f64 = 5.0;

/// Prefix the manifest uses for the upgraded variant of a perk.
pub const ENHANCED_PREFIX: &str = "Enhanced ";

/// Lower-cased form of [`ENHANCED_PREFIX`] for matching normalized names.
pub const ENHANCED_PREFIX_NORMALIZED: &str = "enhanced ";

/// Host prepended to manifest icon paths.
pub const DEFAULT_ICON_HOST: &str = "https://www.bungie.net";

/// Displayed when the manifest has no item type for a weapon.
pub const UNKNOWN_WEAPON_TYPE: &str = "Unknown";

/// Trim and lower-case a display name so catalog and manifest spellings compare equal.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalize a perk name and fold its enhanced variant onto the base name.
pub fn canonical_perk_key(name: &str) -> String {
    let normalized = normalize_name(name);
    match normalized.strip_prefix(ENHANCED_PREFIX_NORMALIZED) {
        Some(base) => base.trim_start().to_owned(),
        None => normalized,
    }
}

/// Strip the first "Enhanced " from a display name, keeping its casing.
pub fn strip_enhanced(name: &str) -> String {
    name.replacen(ENHANCED_PREFIX, "", 1)
}
