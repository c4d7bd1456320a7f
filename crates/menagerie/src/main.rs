//! Menagerie - entry point.

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use menagerie::{build_api, Services};
use menagerie_config::ConfigLoader;
use menagerie_server::Server;
use menagerie_telemetry::{init_logging, init_metrics};

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "MENAGERIE_CONFIG";

/// Configuration file read when none is named.
const DEFAULT_CONFIG_FILE: &str = "menagerie.toml";

struct Args {
    config: Option<PathBuf>,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = std::env::var_os(CONFIG_ENV).map(PathBuf::from);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = args.next().map(PathBuf::from);
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("menagerie {}", menagerie::VERSION);
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        Self { config }
    }
}

fn print_help() {
    println!(
        r"Menagerie - contract-validated books and pets API

USAGE:
    menagerie [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
    -h, --help             Print help information
    -v, --version          Print version information

ENVIRONMENT VARIABLES:
    MENAGERIE_CONFIG                    Configuration file path
    MENAGERIE__SERVER__HTTP_ADDR        Listen address (default: 0.0.0.0:8080)
    MENAGERIE__SERVER__MOUNT_PATH       Route prefix, e.g. /api (default: none)
    MENAGERIE__LOGGING__LEVEL           Log level (default: info)
    MENAGERIE__LOGGING__FORMAT          json or pretty (default: json)
    MENAGERIE__METRICS__ENABLED         Serve Prometheus metrics (default: false)
    MENAGERIE__CONTRACT__UNKNOWN_FIELDS ignore or reject (default: ignore)
    RUST_LOG                            Overrides the configured log filter
"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::new().with_file(path)?,
        None => ConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE)?,
    };
    let config = loader
        .with_dotenv()?
        .with_env_prefix("MENAGERIE")
        .load()
        .context("invalid configuration")?;

    init_logging(&config.logging.to_log_config()).context("failed to initialize logging")?;
    init_metrics(&config.metrics.to_metrics_config()).context("failed to initialize metrics")?;

    info!(version = menagerie::VERSION, config = ?args.config, "Starting Menagerie");

    let api = build_api(&config, Services::default())?;
    Server::new(api, &config.server).run().await?;

    Ok(())
}
