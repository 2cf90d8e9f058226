//! Stevedore CLI - resolve context-aware Helm release manifests

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod display;
mod error;
mod exit_codes;

use commands::RulePaths;
use config::StevedoreConfig;
use error::Result;

#[derive(Parser)]
#[command(name = "stevedore")]
#[command(author = "Stevedore Contributors")]
#[command(version)]
#[command(about = "Resolve context-aware Helm release manifests", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ~/.config/stevedore/config.yaml)
    #[arg(long, global = true, env = "STEVEDORE_CONFIG")]
    config: Option<PathBuf>,

    /// Context to resolve manifests for (defaults to `current`)
    #[arg(long, global = true, env = "STEVEDORE_CONTEXT")]
    context: Option<String>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve manifests for the selected context
    Render {
        /// Manifest file or directory
        #[arg(short = 'f', long = "manifests")]
        manifests: PathBuf,

        /// Override rules file or directory
        #[arg(long)]
        overrides: Option<PathBuf>,

        /// Ignore rules file or directory
        #[arg(long)]
        ignores: Option<PathBuf>,

        /// Env specifications file or directory
        #[arg(long)]
        envs: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the releases left out for the selected context
    Ignored {
        /// Manifest file or directory
        #[arg(short = 'f', long = "manifests")]
        manifests: PathBuf,

        /// Ignore rules file or directory
        #[arg(long)]
        ignores: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List configured contexts
    Contexts,
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = StevedoreConfig::load(cli.config.as_deref())?;
    let context = cli.context.as_deref();

    match cli.command {
        Commands::Render {
            manifests,
            overrides,
            ignores,
            envs,
            json,
        } => commands::render::run(
            &config,
            context,
            &manifests,
            RulePaths {
                overrides: overrides.as_deref(),
                ignores: ignores.as_deref(),
                envs: envs.as_deref(),
            },
            json,
        ),

        Commands::Ignored {
            manifests,
            ignores,
            json,
        } => commands::ignored::run(&config, context, &manifests, ignores.as_deref(), json),

        Commands::Contexts => commands::contexts::run(&config, context),
    }
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let code = match run(cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };

    std::process::exit(code);
}
