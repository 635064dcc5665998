use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rootcause::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vaultscore::ScoreBreakdown;
use vaultscore::catalog::keys::DEFAULT_ICON_HOST;
use vaultscore::catalog::load_weapon_definitions;
use vaultscore::config::RatingConfig;
use vaultscore::inventory::{InventorySnapshot, ProfileResponse};
use vaultscore::manifest::{GeneratedCatalog, ManifestTables};

/// Rate a Destiny 2 weapon vault against curated loot buckets
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the weapon list against exported manifest tables and write the
    /// catalog `rate` reads
    Generate {
        /// DestinyInventoryItemDefinition table as JSON
        #[clap(long, env = "VAULTSCORE_MANIFEST_ITEMS")]
        manifest_items: PathBuf,

        /// DestinyPlugSetDefinition table as JSON
        #[clap(long, env = "VAULTSCORE_MANIFEST_PLUG_SETS")]
        manifest_plug_sets: PathBuf,

        #[clap(long, env = "VAULTSCORE_WEAPONS")]
        weapons: PathBuf,

        #[clap(short, long)]
        output: PathBuf,
    },

    /// Score a saved GetProfile response
    Rate {
        #[clap(long, env = "VAULTSCORE_WEAPONS")]
        weapons: PathBuf,

        /// Catalog written by `generate`
        #[clap(long, env = "VAULTSCORE_CATALOG")]
        catalog: PathBuf,

        /// Bucket table. Defaults to the built-in table
        #[clap(long, env = "VAULTSCORE_BUCKETS")]
        buckets: Option<PathBuf>,

        /// Perk name -> flat bonus table
        #[clap(long, env = "VAULTSCORE_PERK_WEIGHTS")]
        perk_weights: Option<PathBuf>,

        /// An earlier report from this command, used for the weekly change
        #[clap(long)]
        previous: Option<PathBuf>,

        #[clap(long, env = "VAULTSCORE_ICON_HOST", default_value = DEFAULT_ICON_HOST)]
        icon_host: String,

        /// GetProfile response (components 100, 102, 200, 201, 205, 305)
        profile: PathBuf,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct RatingReport {
    username: String,
    rating: ScoreBreakdown,
}

fn open(path: &Path) -> Result<BufReader<File>, Report> {
    let file = File::open(path).context_with(|| format!("Could not open {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn generate(
    manifest_items: &Path,
    manifest_plug_sets: &Path,
    weapons: &Path,
    output: &Path,
) -> Result<(), Report> {
    let definitions = load_weapon_definitions(open(weapons)?)
        .context_with(|| format!("Invalid weapon list {}", weapons.display()))?;
    let manifest = ManifestTables::from_readers(open(manifest_items)?, open(manifest_plug_sets)?)
        .context("Failed to parse manifest tables")?;

    let generated = GeneratedCatalog::generate(&definitions, &manifest);

    let out = File::create(output)
        .context_with(|| format!("Could not create {}", output.display()))?;
    let mut writer = BufWriter::new(out);
    serde_json::to_writer(&mut writer, &generated).context("Failed to write catalog")?;
    writer.flush().context("Failed to write catalog")?;

    info!("catalog written to {}", output.display());
    Ok(())
}

fn rate(config: RatingConfig, previous: Option<&Path>, profile: &Path) -> Result<(), Report> {
    let engine = config.load_engine().context("Failed to load rating inputs")?;

    let profile = ProfileResponse::from_reader(open(profile)?)
        .context_with(|| format!("Invalid profile response {}", profile.display()))?;
    let snapshot = InventorySnapshot::from_profile(profile);

    let mut rating = engine.rate(&snapshot);
    if let Some(path) = previous {
        let earlier: RatingReport = serde_json::from_reader(open(path)?)
            .context_with(|| format!("Invalid previous report {}", path.display()))?;
        rating = rating.with_previous_total(earlier.rating.total_points());
    }

    let report = RatingReport {
        username: snapshot.display_name().unwrap_or_default().to_owned(),
        rating,
    };

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report).context("Failed to write report")?;
    writeln!(stdout).context("Failed to write report")?;
    Ok(())
}

fn main() -> Result<(), Report> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vaultscore=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    match args.command {
        Command::Generate {
            manifest_items,
            manifest_plug_sets,
            weapons,
            output,
        } => generate(&manifest_items, &manifest_plug_sets, &weapons, &output),
        Command::Rate {
            weapons,
            catalog,
            buckets,
            perk_weights,
            previous,
            icon_host,
            profile,
        } => {
            let config = RatingConfig::builder()
                .weapons(weapons)
                .catalog(catalog)
                .maybe_buckets(buckets)
                .maybe_perk_weights(perk_weights)
                .icon_host(icon_host)
                .build();
            rate(config, previous.as_deref(), &profile)
        }
    }
}
