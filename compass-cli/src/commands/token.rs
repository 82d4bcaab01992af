//! Issue and revoke bearer tokens

use anyhow::{Context, Result};
use chrono::Duration;
use clap::{Args, Subcommand};
use compass_core::{SessionManager, SqliteStore};

use super::StoreArgs;
use crate::config::CompassConfig;

#[derive(Debug, Args)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub command: TokenCommands,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Subcommand)]
pub enum TokenCommands {
    /// Issue a token for a user
    Issue {
        /// Username to issue the token for
        #[arg(long)]
        user: String,
        /// Token lifetime in hours (overrides [auth] session_ttl_hours)
        #[arg(long)]
        ttl_hours: Option<i64>,
    },
    /// Revoke a token
    Revoke {
        token: String,
    },
}

pub fn run(args: TokenArgs, config: &CompassConfig) -> Result<()> {
    let sessions = SessionManager::new(args.store.open(config)?);
    match args.command {
        TokenCommands::Issue { user, ttl_hours } => {
            let hours = ttl_hours.unwrap_or(config.auth.session_ttl_hours);
            let token = issue_for(&sessions, &user, hours)?;
            println!("{}", token);
        }
        TokenCommands::Revoke { token } => {
            if sessions.revoke(&token)? {
                println!("Token revoked");
            } else {
                anyhow::bail!("Unknown token");
            }
        }
    }
    Ok(())
}

fn issue_for(sessions: &SessionManager<SqliteStore>, username: &str, hours: i64) -> Result<String> {
    if hours <= 0 {
        anyhow::bail!("Token lifetime must be positive, got {} hours", hours);
    }
    let user = sessions
        .find_user(username)?
        .with_context(|| format!("No user named '{}'", username))?;
    let session = sessions.issue(user.id, Duration::hours(hours))?;
    Ok(session.token)
}
