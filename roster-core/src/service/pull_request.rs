//! Pull-request lifecycle engine
//!
//! Creation draws reviewers from the author's team. Reassignment draws the
//! replacement from the *old reviewer's* team, which may differ from the
//! author's; the two are intentionally not symmetric.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::guarded;
use crate::error::Entity;
use crate::model::{PullRequest, User};
use crate::selection::{ReviewerPicker, REVIEWERS_PER_PR};
use crate::store::{Directory, PullRequestStore};
use crate::{Error, Result};

/// Outcome of a successful reassignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    /// The pull request as persisted after the swap
    pub pr: PullRequest,
    /// Id of the reviewer who took the vacated slot
    pub replaced_by: String,
}

/// Creates, merges and reassigns pull requests
pub struct PullRequestService {
    directory: Arc<dyn Directory>,
    store: Arc<dyn PullRequestStore>,
    picker: ReviewerPicker,
}

impl PullRequestService {
    pub fn new(
        directory: Arc<dyn Directory>,
        store: Arc<dyn PullRequestStore>,
        picker: ReviewerPicker,
    ) -> Self {
        Self {
            directory,
            store,
            picker,
        }
    }

    /// Open a pull request and assign up to two reviewers from the author's team
    #[instrument(name = "roster.pr.create", skip(self, cancel, name), fields(pr_id = %id, author_id = %author_id))]
    pub async fn create_pr(
        &self,
        cancel: &CancellationToken,
        id: &str,
        name: &str,
        author_id: &str,
    ) -> Result<PullRequest> {
        if guarded(cancel, self.store.pr_exists(id)).await? {
            return Err(Error::PrExists(id.to_string()));
        }

        let author = guarded(cancel, self.directory.user_by_id(author_id))
            .await?
            .ok_or_else(|| Error::not_found(Entity::User, author_id))?;

        let team_name = author
            .team()
            .ok_or_else(|| Error::not_found(Entity::Membership, author_id))?
            .to_string();

        if !guarded(cancel, self.directory.team_exists(&team_name)).await? {
            return Err(Error::not_found(Entity::Team, team_name));
        }

        let members = guarded(cancel, self.directory.users_by_team(&team_name)).await?;
        let candidates: Vec<User> = members
            .into_iter()
            .filter(|u| u.is_active && u.id != author_id)
            .collect();

        let reviewers = self.picker.pick(&candidates, REVIEWERS_PER_PR);
        debug!(
            team = %team_name,
            candidates = candidates.len(),
            ?reviewers,
            "Selected reviewers"
        );

        let pr = PullRequest::open(id, name, author_id, reviewers, Utc::now());
        if let Err(err) = guarded(cancel, self.store.create_pr(&pr)).await {
            // A concurrent create can land between the existence check and the insert
            if matches!(err, Error::Storage(_))
                && guarded(cancel, self.store.pr_exists(id)).await?
            {
                warn!(error = %err, "Pull request created concurrently");
                return Err(Error::PrExists(id.to_string()));
            }
            return Err(err);
        }

        info!(reviewers = pr.reviewers.len(), "Pull request created");
        Ok(pr)
    }

    /// Merge a pull request; merging an already merged one returns it unchanged
    #[instrument(name = "roster.pr.merge", skip(self, cancel), fields(pr_id = %id))]
    pub async fn merge_pr(&self, cancel: &CancellationToken, id: &str) -> Result<PullRequest> {
        let mut pr = guarded(cancel, self.store.pr_by_id(id))
            .await?
            .ok_or_else(|| Error::not_found(Entity::PullRequest, id))?;

        if !pr.merge(Utc::now()) {
            debug!("Pull request already merged");
            return Ok(pr);
        }

        guarded(cancel, self.store.update_pr(&pr)).await?;

        info!("Pull request merged");
        Ok(pr)
    }

    /// Replace one reviewer of an open pull request with another member of that reviewer's team
    #[instrument(
        name = "roster.pr.reassign",
        skip(self, cancel),
        fields(pr_id = %pr_id, old_reviewer_id = %old_reviewer_id)
    )]
    pub async fn reassign_reviewer(
        &self,
        cancel: &CancellationToken,
        pr_id: &str,
        old_reviewer_id: &str,
    ) -> Result<Reassignment> {
        let mut pr = guarded(cancel, self.store.pr_by_id(pr_id))
            .await?
            .ok_or_else(|| Error::not_found(Entity::PullRequest, pr_id))?;

        if pr.status.is_terminal() {
            return Err(Error::PrMerged(pr_id.to_string()));
        }

        let slot = pr
            .reviewer_slot(old_reviewer_id)
            .ok_or_else(|| Error::NotAssigned {
                pr_id: pr_id.to_string(),
                reviewer_id: old_reviewer_id.to_string(),
            })?;

        let old_reviewer = guarded(cancel, self.directory.user_by_id(old_reviewer_id))
            .await?
            .ok_or_else(|| Error::not_found(Entity::User, old_reviewer_id))?;

        let team_name = old_reviewer
            .team()
            .ok_or_else(|| Error::not_found(Entity::Membership, old_reviewer_id))?
            .to_string();

        let members = guarded(cancel, self.directory.users_by_team(&team_name)).await?;

        // The current reviewer set includes the old reviewer, so this also
        // rules out handing the slot straight back.
        let assigned: HashSet<&str> = pr.reviewers.iter().map(String::as_str).collect();
        let candidates: Vec<User> = members
            .into_iter()
            .filter(|u| {
                u.is_active
                    && u.id != old_reviewer_id
                    && u.id != pr.author_id
                    && !assigned.contains(u.id.as_str())
            })
            .collect();

        let replaced_by = self
            .picker
            .pick(&candidates, 1)
            .into_iter()
            .next()
            .ok_or_else(|| Error::NoCandidate(team_name.clone()))?;

        debug!(
            team = %team_name,
            candidates = candidates.len(),
            replaced_by = %replaced_by,
            "Selected replacement reviewer"
        );

        pr.replace_reviewer(slot, replaced_by.clone());
        guarded(cancel, self.store.update_pr(&pr)).await?;

        info!(replaced_by = %replaced_by, "Reviewer reassigned");
        Ok(Reassignment { pr, replaced_by })
    }
}
