mod bootstrap_cmd;
mod check_config_cmd;
mod inspect_cmd;
mod settings;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use plexus_config::{apply_all_defaults, config_dir, config_file_path, load_and_prepare, load_config};
use plexus_extensions::ExtensionSorter;

#[derive(Parser)]
#[command(name = "plexus")]
#[command(about = "Plexus: extension registration and bootstrap")]
#[command(version)]
struct Cli {
    /// Config file (default: $PLEXUS_CONFIG_DIR/plexus.yaml or ~/.plexus/plexus.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive, overriding the config
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List bundles and their extensions in registration order
    Inspect {
        /// Bundle directory, overriding the config
        #[arg(short, long)]
        bundles: Option<PathBuf>,
    },
    /// Run the extension bootstrap and list the registered services
    Bootstrap {
        /// Bundle directory, overriding the config
        #[arg(short, long)]
        bundles: Option<PathBuf>,
    },
    /// Validate the config file
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_file_path(&config_dir()));

    // Logging is configured from the raw file so that config problems found
    // later are reported through it.
    let raw = load_config(&path).await?;
    plexus_logging::init_logger(&settings::log_options(
        &apply_all_defaults(raw.clone()),
        cli.log_level.as_deref(),
    ));
    debug!(path = %path.display(), "Using config");

    match cli.command {
        Commands::Inspect { bundles } => {
            let config = load_and_prepare(&path).await?;
            let catalog = settings::bundle_catalog(&config, bundles.as_deref())?;
            let sorter = ExtensionSorter::new(settings::priority_resolver(&config));
            inspect_cmd::run(&catalog, &sorter)?;
        }
        Commands::Bootstrap { bundles } => {
            let config = load_and_prepare(&path).await?;
            let catalog = settings::bundle_catalog(&config, bundles.as_deref())?;
            bootstrap_cmd::run(
                &catalog,
                settings::priority_resolver(&config),
                &settings::collection_suffix(&config),
            )
            .await?;
        }
        Commands::CheckConfig => check_config_cmd::run(&path, &raw)?,
    }

    Ok(())
}
