mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    consult::ConsultSubcommand, lab::LabSubcommand, request::RequestSubcommand,
    user::UserSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "upstac",
    about = "COVID-19 test-request workflow: intake, lab testing and doctor consultation",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .upstac/)
    #[arg(long, global = true, env = "UPSTAC_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize an upstac project in the current directory
    Init {
        /// Project name (default: directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Manage users, roles and API tokens
    User {
        #[command(subcommand)]
        subcommand: UserSubcommand,
    },

    /// File and inspect test requests
    Request {
        #[command(subcommand)]
        subcommand: RequestSubcommand,
    },

    /// Lab testing (TESTER)
    Lab {
        #[command(subcommand)]
        subcommand: LabSubcommand,
    },

    /// Doctor consultation (DOCTOR)
    Consult {
        #[command(subcommand)]
        subcommand: ConsultSubcommand,
    },

    /// Run the HTTP API
    Serve {
        /// Bind address (default: server.host from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default: server.port from config, 0 = OS-assigned)
        #[arg(long)]
        port: Option<u16>,
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
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref()),
        Commands::User { subcommand } => cmd::user::run(&root, subcommand, cli.json),
        Commands::Request { subcommand } => cmd::request::run(&root, subcommand, cli.json),
        Commands::Lab { subcommand } => cmd::lab::run(&root, subcommand, cli.json),
        Commands::Consult { subcommand } => cmd::consult::run(&root, subcommand, cli.json),
        Commands::Serve { host, port } => cmd::serve::run(&root, host, port),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
