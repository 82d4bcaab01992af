//! Manage assessment users

use anyhow::Result;
use clap::{Args, Subcommand};
use compass_core::SessionManager;

use super::StoreArgs;
use crate::config::CompassConfig;

#[derive(Debug, Args)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommands,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Subcommand)]
pub enum UserCommands {
    /// Create a user
    Add {
        /// Unique username
        username: String,
        /// Unique email address
        email: String,
    },
}

pub fn run(args: UserArgs, config: &CompassConfig) -> Result<()> {
    let sessions = SessionManager::new(args.store.open(config)?);
    match args.command {
        UserCommands::Add { username, email } => {
            if sessions.find_user(&username)?.is_some() {
                anyhow::bail!("User '{}' already exists", username);
            }
            let user = sessions.create_user(&username, &email)?;
            println!("Created user {} (id {})", user.username, user.id);
        }
    }
    Ok(())
}
