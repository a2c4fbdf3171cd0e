//! fairval - value a security from a market snapshot.
//!
//! Reads one snapshot JSON document (a file or `-` for stdin), runs the
//! requested valuation models and prints the report as JSON on stdout.
//! Logs go to stderr.

use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

use fairval_common::config::{config_dir, Config};
use fairval_common::config_loader::check_modular_files;
use fairval_common::error::{Error, Result, ResultExt};
use fairval_common::logging::{generate_request_id, init_from_config};
use fairval_engine::{FinancialSnapshot, ModelKind, ValuationEngine};

#[derive(Parser, Debug)]
#[command(name = "fairval")]
#[command(version)]
#[command(about = "Classical equity valuation over a market snapshot", long_about = None)]
struct Cli {
    /// Configuration directory (defaults to $FAIRVAL_CONFIG_DIR or ~/.fairval)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Value a snapshot and print the report
    Evaluate {
        /// Snapshot JSON file, or `-` for stdin
        snapshot: PathBuf,

        /// Model to run (repeatable); all models when omitted
        #[arg(short, long = "model")]
        models: Vec<ModelKind>,

        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print the effective configuration
    Config {
        /// List the configuration files and whether each exists instead
        #[arg(long)]
        files: bool,
    },

    /// List model identifiers
    Models,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    let dir = cli.config_dir.unwrap_or_else(config_dir);
    let config = load_config(&dir)?;
    init_from_config(&config.observability);

    match cli.command {
        Commands::Evaluate {
            snapshot,
            models,
            compact,
        } => {
            let request_id = generate_request_id();
            let span = tracing::info_span!("evaluate", request_id = %request_id);
            let _guard = span.enter();

            let snapshot = read_snapshot(&snapshot)?;
            let engine = ValuationEngine::with_config(config.valuation);

            let report = if models.is_empty() {
                engine.evaluate_all(&snapshot)
            } else {
                engine.evaluate(&snapshot, &models)
            };

            tracing::info!(
                symbol = report.symbol.as_deref().unwrap_or("-"),
                succeeded = report.success_count(),
                failed = report.failure_count(),
                "Report ready"
            );

            print_json(&report, compact)
        }
        Commands::Config { files: false } => print_json(&config, false),
        Commands::Config { files: true } => {
            println!("{}", dir.display());
            for (file, exists) in check_modular_files(Some(dir)) {
                let status = if exists { "present" } else { "missing" };
                println!("  {:<16} {}", file, status);
            }
            Ok(())
        }
        Commands::Models => {
            for kind in ModelKind::ALL {
                println!("{:<18} {}", kind.as_str(), kind.description());
            }
            Ok(())
        }
    }
}

fn load_config(dir: &Path) -> Result<Config> {
    let mut config =
        Config::load_from_dir(dir).map_err(|e| Error::Config(format!("{:#}", e)))?;
    config.apply_env_overrides();
    config.validate()?;

    Ok(config)
}

fn read_snapshot(path: &Path) -> Result<FinancialSnapshot> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read snapshot from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .context(format!("Failed to read snapshot {}", path.display()))?
    };

    FinancialSnapshot::from_json(&content)
        .map_err(|e| Error::InvalidInput(format!("malformed snapshot: {}", e)))
}

fn print_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<()> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", json);
    Ok(())
}
