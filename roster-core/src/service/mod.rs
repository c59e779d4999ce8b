//! Services: the pull-request lifecycle engine plus team and user operations
//!
//! Every operation takes a [`CancellationToken`]. Each collaborator call is
//! raced against the token, so a cancelled operation stops at the next await
//! with [`Error::Cancelled`]. Writes that already committed stay committed.

mod pull_request;
mod team;
mod user;

pub use pull_request::{PullRequestService, Reassignment};
pub use team::TeamService;
pub use user::UserService;

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::selection::ReviewerPicker;
use crate::store::{Directory, PullRequestStore};
use crate::{Error, Result};

/// Await `fut` unless `cancel` fires first.
pub(crate) async fn guarded<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = fut => result,
    }
}

/// All services wired to one pair of collaborators
#[derive(Clone)]
pub struct Services {
    pub pull_requests: Arc<PullRequestService>,
    pub teams: Arc<TeamService>,
    pub users: Arc<UserService>,
}

impl Services {
    pub fn new(
        directory: Arc<dyn Directory>,
        store: Arc<dyn PullRequestStore>,
        picker: ReviewerPicker,
    ) -> Self {
        Self {
            pull_requests: Arc::new(PullRequestService::new(
                directory.clone(),
                store.clone(),
                picker,
            )),
            teams: Arc::new(TeamService::new(directory.clone())),
            users: Arc::new(UserService::new(directory, store)),
        }
    }
}
