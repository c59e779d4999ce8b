//! User operations

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::guarded;
use crate::error::Entity;
use crate::model::{PullRequestShort, User};
use crate::store::{Directory, PullRequestStore};
use crate::{Error, Result};

pub struct UserService {
    directory: Arc<dyn Directory>,
    store: Arc<dyn PullRequestStore>,
}

impl UserService {
    pub fn new(directory: Arc<dyn Directory>, store: Arc<dyn PullRequestStore>) -> Self {
        Self { directory, store }
    }

    /// Toggle whether a user may be picked as a reviewer
    ///
    /// Existing assignments are left alone.
    #[instrument(name = "roster.user.set_active", skip(self, cancel))]
    pub async fn set_is_active(
        &self,
        cancel: &CancellationToken,
        user_id: &str,
        is_active: bool,
    ) -> Result<User> {
        let user = guarded(cancel, self.directory.set_is_active(user_id, is_active))
            .await?
            .ok_or_else(|| Error::not_found(Entity::User, user_id))?;

        info!("User activity updated");
        Ok(user)
    }

    /// Pull requests on which `user_id` is currently a reviewer, ordered by id
    #[instrument(name = "roster.user.reviews", skip(self, cancel))]
    pub async fn reviews(
        &self,
        cancel: &CancellationToken,
        user_id: &str,
    ) -> Result<Vec<PullRequestShort>> {
        if guarded(cancel, self.directory.user_by_id(user_id))
            .await?
            .is_none()
        {
            return Err(Error::not_found(Entity::User, user_id));
        }

        let ids = guarded(cancel, self.store.pr_ids_by_reviewer(user_id)).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut prs = guarded(cancel, self.store.prs_by_ids(&ids)).await?;
        prs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(prs.iter().map(|pr| pr.short()).collect())
    }
}
