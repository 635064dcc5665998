use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use bon::Builder;
use tracing::debug;

use crate::catalog::buckets::default_buckets;
use crate::catalog::keys::DEFAULT_ICON_HOST;
use crate::catalog::types::PerkWeights;
use crate::catalog::{build_weapon_catalog, load_buckets, load_perk_weights, load_weapon_definitions};
use crate::error::IResult;
use crate::manifest::GeneratedCatalog;
use crate::rating::RatingEngine;

/// Where a rating engine's inputs live on disk.
#[derive(Builder, Clone, Debug)]
pub struct RatingConfig {
    /// Hand-written weapon list.
    #[builder(into)]
    weapons: PathBuf,
    /// Output of `vaultscore generate`.
    #[builder(into)]
    catalog: PathBuf,
    /// Bucket table. The built-in table is used when absent.
    #[builder(into)]
    buckets: Option<PathBuf>,
    #[builder(into)]
    perk_weights: Option<PathBuf>,
    #[builder(into, default = DEFAULT_ICON_HOST.to_owned())]
    icon_host: String,
}

fn open(path: &Path) -> IResult<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

impl RatingConfig {
    /// Load and validate every input, then build the engine.
    pub fn load_engine(&self) -> IResult<RatingEngine> {
        let definitions = load_weapon_definitions(open(&self.weapons)?)?;
        let generated = GeneratedCatalog::from_reader(open(&self.catalog)?)?;

        let buckets = match &self.buckets {
            Some(path) => load_buckets(open(path)?)?,
            None => {
                debug!("no bucket file given; using the built-in table");
                default_buckets()
            }
        };
        let weights = match &self.perk_weights {
            Some(path) => load_perk_weights(open(path)?)?,
            None => PerkWeights::default(),
        };

        let weapons = build_weapon_catalog(&definitions, &generated.weapons)?;

        Ok(RatingEngine::new(buckets, weapons, generated.perks, weights)
            .with_icon_host(self.icon_host.as_str()))
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;
    use crate::catalog::types::CatalogProvider;
    use crate::error::ErrorKind;
    use crate::manifest::test::sample_manifest;

    struct Scratch(PathBuf);

    impl Scratch {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("vaultscore-{name}-{}", std::process::id()));
            fs::create_dir_all(&dir).unwrap();
            Scratch(dir)
        }

        fn write(&self, file: &str, contents: &str) -> PathBuf {
            let path = self.0.join(file);
            fs::write(&path, contents).unwrap();
            path
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    const WEAPONS: &str = r#"[
        {"weaponName": "Apex Predator", "desiredPerks": ["Bait and Switch", "Lasting Impression"],
         "bucket": "DPS Rocket", "rank": "1"}
    ]"#;

    #[test]
    fn loads_engine_from_files() {
        let scratch = Scratch::new("config-load");
        let weapons = scratch.write("weapons.json", WEAPONS);
        let definitions = load_weapon_definitions(WEAPONS.as_bytes()).unwrap();
        let generated = GeneratedCatalog::generate(&definitions, &sample_manifest());
        let catalog = scratch.write("catalog.json", &serde_json::to_string(&generated).unwrap());
        let buckets = scratch.write(
            "buckets.json",
            r#"[{"name": "DPS Rocket", "maxPoints": 10, "additionalPoints": 1, "diminishingFactor": 0.5}]"#,
        );

        let engine = RatingConfig::builder()
            .weapons(weapons)
            .catalog(catalog)
            .buckets(buckets)
            .build()
            .load_engine()
            .unwrap();

        assert_eq!(engine.buckets().buckets().len(), 1);
        assert_eq!(
            engine.weapon_by_name("Apex Predator").unwrap().item_hashes().len(),
            2
        );
        assert!(engine.weights().is_empty());
    }

    #[test]
    fn built_in_buckets_are_the_default() {
        let scratch = Scratch::new("config-default");
        let weapons = scratch.write("weapons.json", WEAPONS);
        let catalog = scratch.write(
            "catalog.json",
            &serde_json::to_string(&GeneratedCatalog::default()).unwrap(),
        );

        let engine = RatingConfig::builder()
            .weapons(weapons)
            .catalog(catalog)
            .build()
            .load_engine()
            .unwrap();
        assert_eq!(engine.buckets().buckets().len(), 45);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = RatingConfig::builder()
            .weapons("/nonexistent/weapons.json")
            .catalog("/nonexistent/catalog.json")
            .build()
            .load_engine()
            .err()
            .unwrap();
        assert!(matches!(err.kind, ErrorKind::IoError(_)));
    }
}
