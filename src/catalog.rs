//! Reference data the rating engine is built from.
//!
//! Buckets and weapons are loaded once, validated, and never mutated
//! afterwards. Every lookup returns an `Option` so a missing catalog entry is
//! visible to the caller instead of silently scoring as zero.

/// Built-in bucket table
pub mod buckets;
/// Shared constants for scoring and name normalization
pub mod keys;
/// JSON loading and validation of catalog files
pub mod loader;
/// Catalog record types and lookup tables
pub mod types;

pub use loader::{
    build_weapon_catalog, load_buckets, load_perk_weights, load_weapon_definitions,
    validate_weapon_definitions,
};
pub use types::*;
