use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "compass", about = "Adaptive entrepreneurship assessment backend")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed, import or list the question catalog
    Catalog(commands::catalog::CatalogArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Show a user's assessment progress
    Progress(commands::progress::ProgressArgs),
    /// Run the compass server
    Serve(commands::serve::ServeArgs),
    /// Issue or revoke bearer tokens
    Token(commands::token::TokenArgs),
    /// Manage users
    User(commands::user::UserArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = config::ConfigLoader::load()?;

    match cli.command {
        Commands::Catalog(args) => commands::catalog::run(args, &config),
        Commands::Config(args) => commands::config::run(args, &config),
        Commands::Progress(args) => commands::progress::run(args, &config),
        Commands::Serve(args) => commands::serve::run(args, &config).await,
        Commands::Token(args) => commands::token::run(args, &config),
        Commands::User(args) => commands::user::run(args, &config),
    }
}
