use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use revlens::cli::commands::analyze::AnalyzeOptions;
use revlens::cli::commands::insights::InsightOptions;
use revlens::constants::sample;

#[derive(Parser)]
#[command(name = "revlens")]
#[command(
    version,
    about = "Sales analytics dashboard: weekly trends, anomaly detection, AI insights"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a sales export and render the dashboard
    Analyze {
        #[arg(help = "CSV or Excel sales export")]
        file: PathBuf,
        #[arg(
            long,
            help = "Anomaly sensitivity: expected anomalous share of weeks (0-0.5]"
        )]
        sensitivity: Option<f64>,
        #[arg(long, help = "Detector RNG seed")]
        seed: Option<u64>,
        #[arg(long, help = "Entries per ranking table")]
        top: Option<usize>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Analyze and generate a narrative summary via a text provider
    Insights {
        #[arg(help = "CSV or Excel sales export")]
        file: PathBuf,
        #[arg(
            long,
            help = "Anomaly sensitivity: expected anomalous share of weeks (0-0.5]"
        )]
        sensitivity: Option<f64>,
        #[arg(long, help = "Detector RNG seed")]
        seed: Option<u64>,
        #[arg(long, help = "Entries per ranking table")]
        top: Option<usize>,
        #[arg(long, help = "Text provider (gemini, openai)")]
        provider: Option<String>,
        #[arg(long, help = "Model override")]
        model: Option<String>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Write a deterministic synthetic sales export for trying the dashboard
    Sample {
        #[arg(long, short, default_value = "sample_sales.csv")]
        out: PathBuf,
        #[arg(long, default_value_t = sample::DEFAULT_ROWS)]
        rows: usize,
        #[arg(long, default_value_t = sample::DEFAULT_SEED)]
        seed: u64,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'g', long, help = "Show global config file only")]
        global: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Write a commented configuration template
    Init {
        #[arg(long, short, help = "Initialize the global config")]
        global: bool,
        #[arg(long, help = "Overwrite an existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mrevlens encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Analyze {
            file,
            sensitivity,
            seed,
            top,
            format,
        } => {
            let options = AnalyzeOptions {
                sensitivity,
                seed,
                top,
            };
            revlens::cli::commands::analyze::run(&file, &options, &format)?;
        }
        Commands::Insights {
            file,
            sensitivity,
            seed,
            top,
            provider,
            model,
            format,
        } => {
            let options = InsightOptions {
                analyze: AnalyzeOptions {
                    sensitivity,
                    seed,
                    top,
                },
                provider,
                model,
            };
            let rt = Runtime::new()?;
            rt.block_on(revlens::cli::commands::insights::run(
                &file, &options, &format,
            ))?;
        }
        Commands::Sample { out, rows, seed } => {
            revlens::cli::commands::sample::run(&out, rows, seed)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => {
                revlens::cli::commands::config::show(global, &format)?;
            }
            ConfigAction::Path => {
                revlens::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                revlens::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
