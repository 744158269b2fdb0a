//! abi-typegen main entry point

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use typegen_core::TypegenConfig;
use typegen_ethers::TargetRegistry;
use typegen_pipeline::{clean, FsWriter, GenerationRequest, TypegenRunner};

#[derive(Parser)]
#[command(name = "abi-typegen")]
#[command(author, version, about = "Generate TypeScript declarations from contract ABIs", long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate declaration and index files
    Generate {
        /// Every artifact of the project
        artifacts: Vec<PathBuf>,

        /// Artifacts changed since the previous run
        #[arg(long, value_delimiter = ',')]
        changed: Vec<PathBuf>,

        /// Regenerate everything regardless of what changed
        #[arg(long)]
        full_rebuild: bool,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory, overrides the config file
        #[arg(long)]
        out_dir: Option<String>,

        /// Target identifier, overrides the config file
        #[arg(long)]
        target: Option<String>,
    },

    /// Remove the output directory
    Clean {
        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory, overrides the config file
        #[arg(long)]
        out_dir: Option<String>,
    },

    /// List available targets
    Targets,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            artifacts,
            changed,
            full_rebuild,
            config,
            out_dir,
            target,
        } => {
            let mut config = load_config(config.as_deref(), out_dir)?;
            if let Some(target) = target {
                config.target_identifier = target;
            }
            config.validate()?;

            let target = TargetRegistry::new().create(&config)?;
            let writer = FsWriter::new(&config.output_directory);
            let request = GenerationRequest {
                all_artifacts: artifacts,
                changed_artifacts: changed,
                full_rebuild,
            };

            let outcome = TypegenRunner::new(&config, target.as_ref(), &writer)
                .run(&request)
                .await?;

            if !outcome.is_success() {
                for failure in &outcome.failures {
                    eprintln!("{}: {}", failure.artifact.display(), failure.error);
                }
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Clean { config, out_dir } => {
            let config = load_config(config.as_deref(), out_dir)?;
            if !clean(Path::new(&config.output_directory)).await? {
                println!("Nothing to clean.");
            }
        }

        Commands::Targets => {
            for name in TargetRegistry::new().list_targets() {
                println!("{}", name);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>, out_dir: Option<String>) -> Result<TypegenConfig> {
    let mut config = match path {
        Some(path) => TypegenConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => TypegenConfig::default(),
    };

    if let Some(out_dir) = out_dir {
        config.output_directory = out_dir;
    }
    Ok(config)
}
