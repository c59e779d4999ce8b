//! Team commands

use clap::{Args, Subcommand};
use roster_core::{Config, Team, TeamMember};
use tokio_util::sync::CancellationToken;

use super::open_services;

/// Team management commands
#[derive(Args, Debug)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommand,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// Create a team with its members
    Add {
        /// Team name
        name: String,

        /// Member as `id:username`, or `id:username:inactive`
        #[arg(short, long = "member", value_parser = parse_member)]
        members: Vec<TeamMember>,
    },

    /// Show a team and its members
    Get {
        /// Team name
        name: String,
    },
}

impl TeamArgs {
    /// Execute the team command
    pub async fn execute(self, config: &Config) -> anyhow::Result<()> {
        let (db, services) = open_services(config).await?;
        let cancel = CancellationToken::new();

        let team = match self.command {
            TeamCommand::Add { name, members } => {
                services.teams.add_team(&cancel, &name, members).await?
            }
            TeamCommand::Get { name } => services.teams.get_team(&cancel, &name).await?,
        };
        print_team(&team);

        db.close().await;
        Ok(())
    }
}

fn print_team(team: &Team) {
    println!("{} ({} members)", team.name, team.members.len());
    for member in &team.members {
        let state = if member.is_active { "active" } else { "inactive" };
        println!("  {:<16} {:<24} {}", member.id, member.username, state);
    }
}

/// Parse `id:username[:inactive]`
fn parse_member(raw: &str) -> Result<TeamMember, String> {
    let mut parts = raw.split(':');
    let id = parts.next().unwrap_or_default().trim();
    let username = parts.next().map(str::trim).unwrap_or_default();
    let is_active = match parts.next().map(str::trim) {
        None | Some("active") => true,
        Some("inactive") => false,
        Some(other) => return Err(format!("unknown member state '{other}'")),
    };

    if id.is_empty() || username.is_empty() || parts.next().is_some() {
        return Err(format!("expected id:username[:inactive], got '{raw}'"));
    }
    Ok(TeamMember::new(id, username, is_active))
}
