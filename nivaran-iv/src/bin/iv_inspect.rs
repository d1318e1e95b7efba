//! iv-inspect - Image validation inspector
//!
//! Runs one image file through the full validation pipeline and prints the
//! decision record as JSON, or with `--verdict-only` runs just the source
//! classifier. External providers stay disabled; EXIF location checking
//! runs locally against the declared coordinates.

use anyhow::{Context, Result};
use clap::Parser;
use nivaran_common::{Coordinates, IssueCategory};
use nivaran_iv::{ImageSubmission, IvConfig, Providers, SourceForensics, ValidationPipeline};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "iv-inspect",
    version,
    about = "Validate a citizen-report image from the command line"
)]
struct Args {
    /// Image file to validate
    image: PathBuf,

    /// Declared issue category of the report
    #[arg(long, default_value = "others")]
    category: String,

    /// Declared issue location as "lat,lng"
    #[arg(long)]
    location: Option<String>,

    /// Reject images carrying no usable EXIF instead of warning
    #[arg(long)]
    strict_exif: bool,

    /// Print only the source-forensics verdict, skipping the decision engine
    #[arg(long)]
    verdict_only: bool,

    /// Config file path (overrides NIVARAN_IV_CONFIG)
    #[arg(long)]
    config: Option<String>,
}

fn parse_location(raw: &str) -> Result<Coordinates> {
    let (lat, lng) = raw
        .split_once(',')
        .context("expected --location as \"lat,lng\"")?;
    Ok(Coordinates {
        lat: lat.trim().parse().context("latitude is not a number")?,
        lng: lng.trim().parse().context("longitude is not a number")?,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = IvConfig::load(args.config.as_deref())?;
    if args.strict_exif {
        config.policy.strict_exif = true;
    }

    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("failed to read {}", args.image.display()))?;
    let filename = args
        .image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if args.verdict_only {
        let verdict =
            SourceForensics::with_thresholds(config.forensics).classify(&bytes, &filename);
        println!("{}", serde_json::to_string_pretty(&verdict)?);
        return Ok(());
    }

    let category = IssueCategory::parse(&args.category)
        .with_context(|| format!("unknown category '{}'", args.category))?;
    let location = args.location.as_deref().map(parse_location).transpose()?;

    info!(image = %args.image.display(), "starting validation");

    let providers = Providers::local(config.policy.default_allowed_radius_km);
    let pipeline = ValidationPipeline::with_providers(config, providers);
    let record = pipeline
        .validate(&ImageSubmission {
            bytes,
            filename,
            declared_category: category,
            declared_location: location,
        })
        .await?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
