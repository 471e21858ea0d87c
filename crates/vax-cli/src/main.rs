mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{catalog::CatalogSubcommand, config::ConfigSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "vax",
    about = "Vaccination appointment dialogue over a socket: serve it, join it, query its catalog",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .vax/)
    #[arg(long, global = true, env = "VAX_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .vax/ with a default config and the sample catalog
    Init,

    /// Accept one client and run the appointment dialogue with it
    Serve {
        /// Address to bind (default: server.host from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (default: server.port from config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Join a running server as an interactive client
    Connect {
        /// Server address (default: server.host from config)
        #[arg(long)]
        host: Option<String>,

        /// Server port (default: server.port from config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run the selection queries against the catalog
    Catalog {
        #[command(subcommand)]
        subcommand: CatalogSubcommand,
    },

    /// Check second-dose eligibility for a first-dose date (DD/MM/YYYY)
    Eligibility {
        date: String,

        /// Evaluate as of this date instead of today (DD/MM/YYYY)
        #[arg(long)]
        today: Option<String>,
    },

    /// Show or validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Serve { host, port } => cmd::serve::run(&root, host, port, cli.json),
        Commands::Connect { host, port } => cmd::connect::run(&root, host, port),
        Commands::Catalog { subcommand } => cmd::catalog::run(&root, subcommand, cli.json),
        Commands::Eligibility { date, today } => {
            cmd::eligibility::run(&root, &date, today.as_deref(), cli.json)
        }
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
