//! Parameter Builder CLI
//!
//! Charted shots (JSON) -> accuracy parameter table (JSON / YAML / CSV)

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use param_builder::ParamFormat;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "param_builder")]
#[command(about = "Build curling accuracy parameters from charted shots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Run the accuracy pipeline and write the parameter table
    Build {
        /// Input shot records (.json array or .jsonl)
        #[arg(long)]
        r#in: PathBuf,

        /// Output parameter table path
        #[arg(long)]
        out: PathBuf,

        /// Pipeline config file (YAML or JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Threshold profile (default, strict, lenient)
        #[arg(long)]
        profile: Option<String>,

        /// Output format, guessed from the extension when omitted
        #[arg(long, value_enum)]
        format: Option<ParamFormat>,

        /// Include per-player parameters
        #[arg(long, default_value = "false")]
        by_player: bool,

        /// Verify the written file against its checksum
        #[arg(long, default_value = "false")]
        verify: bool,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Print the category assigned to every shot as CSV
    Classify {
        /// Input shot records (.json array or .jsonl)
        #[arg(long)]
        r#in: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        profile: Option<String>,
    },

    /// Print a pipeline configuration as YAML
    Config {
        #[arg(long)]
        profile: Option<String>,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            r#in,
            out,
            config,
            profile,
            format,
            by_player,
            verify,
            metadata,
        } => {
            let format = format.unwrap_or_else(|| ParamFormat::from_path(&out));
            println!("🔨 Building accuracy parameters...");
            println!("   Input:  {}", r#in.display());
            println!("   Output: {} ({:?})", out.display(), format);

            let records = param_builder::load_shot_records(&r#in)?;
            let config = param_builder::load_config(config.as_deref(), profile.as_deref())?;
            let (report, table) = param_builder::build_parameters(&records, config, by_player);
            param_builder::ensure_measured(&report)?;

            let checksum = param_builder::write_parameter_table(&table, &out, format)?;
            let meta = param_builder::build_metadata(&report, checksum);
            print_metadata(&meta);

            if verify {
                verify_output_integrity(&out, &meta.checksum)?;
            }

            if let Some(metadata_path) = metadata {
                save_metadata(&metadata_path, &meta)?;
            }
        }

        Commands::Classify {
            r#in,
            config,
            profile,
        } => {
            let records = param_builder::load_shot_records(&r#in)?;
            let config = param_builder::load_config(config.as_deref(), profile.as_deref())?;
            let rows = param_builder::classification_rows(&records, &config);
            param_builder::write_classification_csv(&rows, std::io::stdout().lock())?;
        }

        Commands::Config { profile } => {
            let config = param_builder::load_config(None, profile.as_deref())?;
            print!("{}", serde_yaml::to_string(&config)?);
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_metadata(meta: &param_builder::BuildMetadata) {
    println!("\n✅ Parameters built successfully!");
    println!("   Records:   {}", meta.record_count);
    println!("   Measured:  {}", meta.measured_count);
    println!(
        "   Excluded:  {} malformed, {} unknown, {} inference, {} geometry",
        meta.malformed, meta.unknown, meta.inference_error, meta.missing_geometry
    );
    if !meta.low_confidence_groups.is_empty() {
        println!("   Low sample: {}", meta.low_confidence_groups.join(", "));
    }
    if !meta.unmeasured_categories.is_empty() {
        println!("   No data:   {}", meta.unmeasured_categories.join(", "));
    }
    println!("   Checksum:  {}", meta.checksum);
    println!("   Created:   {}", meta.created_at);
}

#[cfg(feature = "cli")]
fn verify_output_integrity(path: &std::path::Path, checksum: &str) -> Result<()> {
    println!("\n🔍 Verifying output integrity...");
    if param_builder::verify_output(path, checksum)? {
        println!("✅ Output verification passed");
        Ok(())
    } else {
        anyhow::bail!("❌ Output verification failed - checksum mismatch!")
    }
}

#[cfg(feature = "cli")]
fn save_metadata(path: &PathBuf, meta: &param_builder::BuildMetadata) -> Result<()> {
    let metadata_json = serde_json::to_string_pretty(meta)?;
    std::fs::write(path, metadata_json)?;
    println!("\n📄 Metadata saved to: {}", path.display());
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("param_builder CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
