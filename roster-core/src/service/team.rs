//! Team operations

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::guarded;
use crate::error::Entity;
use crate::model::{Team, TeamMember, User};
use crate::store::Directory;
use crate::{Error, Result};

pub struct TeamService {
    directory: Arc<dyn Directory>,
}

impl TeamService {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// Create a team together with its members
    ///
    /// Fails with [`Error::TeamExists`] for a taken name and
    /// [`Error::UserExists`] when a listed member already has a team.
    #[instrument(name = "roster.team.add", skip(self, cancel, members), fields(members = members.len()))]
    pub async fn add_team(
        &self,
        cancel: &CancellationToken,
        team_name: &str,
        members: Vec<TeamMember>,
    ) -> Result<Team> {
        if guarded(cancel, self.directory.team_exists(team_name)).await? {
            return Err(Error::TeamExists(team_name.to_string()));
        }

        for member in &members {
            let existing = guarded(cancel, self.directory.user_by_id(&member.user_id)).await?;
            if let Some(team) = existing.as_ref().and_then(User::team) {
                return Err(Error::UserExists {
                    user_id: member.user_id.clone(),
                    team_name: team.to_string(),
                });
            }
        }

        let users: Vec<User> = members
            .into_iter()
            .map(|m| m.into_user(team_name))
            .collect();
        guarded(cancel, self.directory.create_team(team_name, &users)).await?;

        info!("Team created");
        self.load(cancel, team_name).await
    }

    /// Fetch a team and its members ordered by user id
    #[instrument(name = "roster.team.get", skip(self, cancel))]
    pub async fn get_team(&self, cancel: &CancellationToken, team_name: &str) -> Result<Team> {
        if !guarded(cancel, self.directory.team_exists(team_name)).await? {
            return Err(Error::not_found(Entity::Team, team_name));
        }
        self.load(cancel, team_name).await
    }

    async fn load(&self, cancel: &CancellationToken, team_name: &str) -> Result<Team> {
        let mut members = guarded(cancel, self.directory.users_by_team(team_name)).await?;
        members.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(Team {
            name: team_name.to_string(),
            members,
        })
    }
}
