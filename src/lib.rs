/// Static reference catalogs: scoring buckets, curated weapons and perk weights
pub mod catalog;
/// Loading a scoring engine from files on disk
pub mod config;
/// Error definitions
pub mod error;
/// Player inventory snapshots built from a Bungie profile response
pub mod inventory;
/// Utilities for resolving curated weapons against the Bungie item manifest
pub mod manifest;
/// Perk name <-> plug hash resolution
pub mod perks;
/// Ownership classification, bucket scoring and recommendations
pub mod rating;

pub use catalog::types::{Bucket, ItemHash, WeaponRecord};
pub use rating::{RatingEngine, breakdown::ScoreBreakdown};

#[cfg(feature = "arc")]
pub type Rc<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub type Rc<T> = std::rc::Rc<T>;
