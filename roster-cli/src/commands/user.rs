//! User commands

use clap::{ArgAction, Args, Subcommand};
use roster_core::Config;
use tokio_util::sync::CancellationToken;

use super::open_services;

/// User management commands
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Mark a user as available (true) or unavailable (false) for review
    SetActive {
        /// User id
        id: String,

        /// `true` or `false`
        #[arg(action = ArgAction::Set)]
        active: bool,
    },

    /// List open and merged pull requests the user reviews
    Reviews {
        /// User id
        id: String,
    },
}

impl UserArgs {
    /// Execute the user command
    pub async fn execute(self, config: &Config) -> anyhow::Result<()> {
        let (db, services) = open_services(config).await?;
        let cancel = CancellationToken::new();

        match self.command {
            UserCommand::SetActive { id, active } => {
                let user = services.users.set_is_active(&cancel, &id, active).await?;
                let state = if user.is_active { "active" } else { "inactive" };
                println!("{} ({}) is now {}", user.id, user.username, state);
            }
            UserCommand::Reviews { id } => {
                let prs = services.users.reviews(&cancel, &id).await?;
                if prs.is_empty() {
                    println!("{id} has no review assignments");
                }
                for pr in prs {
                    println!("{:<16} {:<7} {} (by {})", pr.id, pr.status.as_str(), pr.name, pr.author_id);
                }
            }
        }

        db.close().await;
        Ok(())
    }
}
