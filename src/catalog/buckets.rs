//! The bucket table used when no bucket file is supplied.

use super::types::{Bucket, BucketCatalog};

/// `(name, maxPoints, additionalPoints, diminishingFactor)`
const DEFAULT_BUCKETS: &[(&str, f64, f64, f64)] = &[
    ("Orb Generation", 10.0, 1.0, 0.5),
    ("Kinetic Rocket Sidearm", 10.0, 1.0, 0.5),
    ("Energy Rocket Sidearm", 10.0, 1.0, 0.5),
    ("DPS Heavy Grenade Launcher", 10.0, 1.0, 0.5),
    ("Exotic Energy Primary", 10.0, 1.0, 0.5),
    ("Exotic DPS (Consistent)", 9.0, 0.9, 0.5),
    ("Exotic DPS (Total Damage)", 9.0, 0.9, 0.5),
    ("Exotic Debuff", 10.0, 1.0, 0.5),
    ("Team Support Weapon", 7.0, 0.7, 0.5),
    ("Add Clear with Damage Resistance", 7.0, 0.7, 0.5),
    ("Kinetic One-Two Punch", 7.0, 0.7, 0.5),
    ("Weaken on Demand", 6.0, 0.6, 0.5),
    ("Hitscan Overload Stun", 6.0, 0.6, 0.5),
    ("Kinetic Sniper", 6.0, 0.6, 0.5),
    ("Transcendance Generation", 6.0, 0.6, 0.5),
    ("Machine Gun", 6.0, 0.6, 0.5),
    ("Movement Sword", 6.0, 0.6, 0.5),
    ("Energy Primary", 5.0, 0.5, 0.5),
    ("Exotic Heavy Burst", 5.0, 0.5, 0.5),
    ("Exotic Add Clear", 5.0, 0.5, 0.5),
    ("Ammoless DPS", 4.0, 0.4, 0.5),
    ("Movement Grenade Launcher", 4.0, 0.4, 0.5),
    ("Energy One-Two Punch", 3.0, 0.3, 0.5),
    ("Kinetic Burst Damage", 3.0, 0.3, 0.5),
    ("Energy Damage Sniper", 3.0, 0.3, 0.5),
    ("Kinetic Fusion", 3.0, 0.3, 0.5),
    ("Energy Fusion", 3.0, 0.3, 0.5),
    ("Energy Wave-Frame", 3.0, 0.3, 0.5),
    ("Kinetic Wave-Frame", 3.0, 0.3, 0.5),
    ("Kinetic Blind", 2.0, 0.2, 0.5),
    ("Energy Blind", 2.0, 0.2, 0.5),
    ("Glaive", 1.0, 0.1, 0.5),
    ("Energy Trace", 2.0, 0.2, 0.5),
    ("DPS Sword", 3.0, 0.3, 0.5),
    ("DPS Rocket", 4.0, 0.4, 0.5),
    ("Linear", 2.0, 0.2, 0.5),
    ("Kinetic Primary", 2.0, 0.2, 0.5),
    ("Kinetic Hand Cannon (Lucky Pants)", 2.0, 0.2, 0.5),
    ("Energy Hand Cannon (Lucky Pants)", 2.0, 0.2, 0.5),
    ("Exotic Kinetic Primary", 3.0, 0.3, 0.5),
    ("Super Generation", 2.0, 0.2, 0.5),
    ("Kinetic SMG (Peacekeepers)", 2.0, 0.2, 0.5),
    ("Exotic Energy Burst", 2.0, 0.2, 0.5),
    ("Survivability", 2.0, 0.2, 0.5),
    ("Exotic Special DPS (Total)", 1.0, 0.1, 0.5),
];

/// Bucket catalog shipped with the crate, in display order.
pub fn default_buckets() -> BucketCatalog {
    BucketCatalog::from(DEFAULT_BUCKETS.iter().map(
        |&(name, max_points, additional_points, diminishing_factor)| {
            Bucket::builder()
                .name(name)
                .max_points(max_points)
                .additional_points(additional_points)
                .diminishing_factor(diminishing_factor)
                .build()
        },
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::catalog::loader::validate_buckets;

    #[test]
    fn default_table_is_valid() {
        let catalog = default_buckets();
        assert_eq!(catalog.buckets().len(), DEFAULT_BUCKETS.len());
        validate_buckets(catalog.buckets().iter().map(|bucket| bucket.as_ref())).unwrap();
    }

    #[test]
    fn dupe_bonus_is_a_tenth_of_max() {
        for bucket in default_buckets().buckets() {
            approx::assert_relative_eq!(
                bucket.additional_points(),
                bucket.max_points() / 10.0,
                epsilon = 1e-9
            );
        }
    }
}
