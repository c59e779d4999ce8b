//! Pull request commands

use clap::{Args, Subcommand};
use roster_core::Config;
use tokio_util::sync::CancellationToken;

use super::{open_services, print_pull_request};

/// Pull request commands
#[derive(Args, Debug)]
pub struct PrArgs {
    #[command(subcommand)]
    pub command: PrCommand,
}

#[derive(Subcommand, Debug)]
pub enum PrCommand {
    /// Open a pull request and assign reviewers from the author's team
    Create {
        /// Pull request id
        id: String,

        /// Pull request title
        name: String,

        /// Author user id
        author: String,
    },

    /// Merge a pull request
    Merge {
        /// Pull request id
        id: String,
    },

    /// Swap a reviewer for another member of that reviewer's team
    Reassign {
        /// Pull request id
        id: String,

        /// Reviewer to replace
        old_reviewer: String,
    },
}

impl PrArgs {
    /// Execute the pull request command
    pub async fn execute(self, config: &Config) -> anyhow::Result<()> {
        let (db, services) = open_services(config).await?;
        let cancel = CancellationToken::new();
        let prs = &services.pull_requests;

        match self.command {
            PrCommand::Create { id, name, author } => {
                let pr = prs.create_pr(&cancel, &id, &name, &author).await?;
                print_pull_request(&pr);
            }
            PrCommand::Merge { id } => {
                let pr = prs.merge_pr(&cancel, &id).await?;
                print_pull_request(&pr);
            }
            PrCommand::Reassign { id, old_reviewer } => {
                let result = prs.reassign_reviewer(&cancel, &id, &old_reviewer).await?;
                println!("{old_reviewer} replaced by {}", result.replaced_by);
                print_pull_request(&result.pr);
            }
        }

        db.close().await;
        Ok(())
    }
}
