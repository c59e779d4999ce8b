//! Persistence collaborators consumed by the services.
//!
//! The services never touch storage directly; they read and write through
//! these two traits. Lookups that find nothing return `Ok(None)`; `Err` is
//! reserved for storage failures, which the services propagate unchanged.

mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;

use crate::model::{PullRequest, User};
use crate::Result;

/// User and team directory.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Look up a user by id.
    async fn user_by_id(&self, id: &str) -> Result<Option<User>>;

    /// All users whose team is `team_name`, active or not, ordered by id.
    async fn users_by_team(&self, team_name: &str) -> Result<Vec<User>>;

    async fn team_exists(&self, team_name: &str) -> Result<bool>;

    /// Create a team and upsert its members in one atomic step.
    ///
    /// Every member is stored with its `team_name` set to `team_name`.
    async fn create_team(&self, team_name: &str, members: &[User]) -> Result<()>;

    /// Persist a user's active flag, returning the updated user.
    async fn set_is_active(&self, id: &str, is_active: bool) -> Result<Option<User>>;
}

/// Pull request store.
///
/// `create_pr` and `update_pr` must commit the pull request row and its
/// reviewer rows together or not at all.
#[async_trait]
pub trait PullRequestStore: Send + Sync {
    async fn pr_exists(&self, id: &str) -> Result<bool>;

    async fn create_pr(&self, pr: &PullRequest) -> Result<()>;

    async fn pr_by_id(&self, id: &str) -> Result<Option<PullRequest>>;

    /// Full replace of the mutable fields and the reviewer set.
    ///
    /// No version check is made: the last write wins.
    async fn update_pr(&self, pr: &PullRequest) -> Result<()>;

    /// Fetch every pull request whose id is in `ids`; unknown ids are skipped.
    async fn prs_by_ids(&self, ids: &[String]) -> Result<Vec<PullRequest>>;

    /// Ids of the pull requests on which `user_id` is a reviewer, ordered by id.
    async fn pr_ids_by_reviewer(&self, user_id: &str) -> Result<Vec<String>>;
}
