//! Pull request record and its status machine

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pull request status
///
/// `Open` is the only creation state; `Merged` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestStatus {
    Open,
    Merged,
}

impl PullRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PullRequestStatus::Open => "OPEN",
            PullRequestStatus::Merged => "MERGED",
        }
    }

    /// Check if no further transition can leave this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, PullRequestStatus::Merged)
    }

    /// Check if moving to `next` is a legal status change
    pub fn can_transition_to(&self, next: PullRequestStatus) -> bool {
        matches!(
            (self, next),
            (PullRequestStatus::Open, PullRequestStatus::Merged)
        )
    }
}

impl fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status string read back from storage or user input
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown pull request status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for PullRequestStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(PullRequestStatus::Open),
            "MERGED" => Ok(PullRequestStatus::Merged),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// A pull request with its assigned reviewers
///
/// Invariants: `author_id` never appears in `reviewers`, `reviewers` holds no
/// duplicates, and a merged pull request always carries `merged_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Globally unique, immutable identifier
    pub id: String,

    /// Free-text label
    pub name: String,

    /// User who opened the pull request
    pub author_id: String,

    pub status: PullRequestStatus,

    /// Ordered reviewer ids; order is significant for in-place replacement
    pub reviewers: Vec<String>,

    /// Set once at creation
    pub created_at: DateTime<Utc>,

    /// Set exactly once, when the pull request is merged
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Create a new open pull request
    pub fn open(
        id: impl Into<String>,
        name: impl Into<String>,
        author_id: impl Into<String>,
        reviewers: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            author_id: author_id.into(),
            status: PullRequestStatus::Open,
            reviewers,
            created_at,
            merged_at: None,
        }
    }

    pub fn is_merged(&self) -> bool {
        self.status == PullRequestStatus::Merged
    }

    /// Mark the pull request as merged
    ///
    /// Returns `false` and leaves the record untouched when it is already merged.
    pub fn merge(&mut self, at: DateTime<Utc>) -> bool {
        if !self.status.can_transition_to(PullRequestStatus::Merged) {
            return false;
        }

        tracing::debug!(
            pr_id = %self.id,
            from = %self.status,
            to = %PullRequestStatus::Merged,
            "Pull request status transition"
        );

        self.status = PullRequestStatus::Merged;
        self.merged_at = Some(at);
        true
    }

    /// Position of a reviewer in the reviewer sequence
    pub fn reviewer_slot(&self, reviewer_id: &str) -> Option<usize> {
        self.reviewers.iter().position(|id| id == reviewer_id)
    }

    pub fn has_reviewer(&self, reviewer_id: &str) -> bool {
        self.reviewer_slot(reviewer_id).is_some()
    }

    /// Put `new_reviewer` into `slot`, returning the id it displaced
    ///
    /// Panics if `slot` is out of range; callers obtain it from `reviewer_slot`.
    pub fn replace_reviewer(&mut self, slot: usize, new_reviewer: impl Into<String>) -> String {
        std::mem::replace(&mut self.reviewers[slot], new_reviewer.into())
    }

    /// Short form used in reviewer listings
    pub fn short(&self) -> PullRequestShort {
        PullRequestShort {
            id: self.id.clone(),
            name: self.name.clone(),
            author_id: self.author_id.clone(),
            status: self.status,
        }
    }
}

/// Pull request summary without reviewers or timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShort {
    pub id: String,
    pub name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PullRequest {
        PullRequest::open(
            "pr-1",
            "Add X",
            "a1",
            vec!["r1".to_string(), "r2".to_string()],
            Utc::now(),
        )
    }

    #[test]
    fn test_status_transitions() {
        assert!(PullRequestStatus::Open.can_transition_to(PullRequestStatus::Merged));
        assert!(!PullRequestStatus::Merged.can_transition_to(PullRequestStatus::Open));
        assert!(!PullRequestStatus::Merged.can_transition_to(PullRequestStatus::Merged));
        assert!(!PullRequestStatus::Open.can_transition_to(PullRequestStatus::Open));
        assert!(PullRequestStatus::Merged.is_terminal());
        assert!(!PullRequestStatus::Open.is_terminal());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("OPEN".parse(), Ok(PullRequestStatus::Open));
        assert_eq!("MERGED".parse(), Ok(PullRequestStatus::Merged));
        assert!("merged".parse::<PullRequestStatus>().is_err());
    }

    #[test]
    fn test_status_serde_uppercase() {
        assert_eq!(
            serde_json::to_string(&PullRequestStatus::Merged).unwrap(),
            "\"MERGED\""
        );
        let parsed: PullRequestStatus = serde_json::from_str("\"OPEN\"").unwrap();
        assert_eq!(parsed, PullRequestStatus::Open);
    }

    #[test]
    fn test_open_pull_request() {
        let pr = sample();
        assert_eq!(pr.status, PullRequestStatus::Open);
        assert!(pr.merged_at.is_none());
        assert!(!pr.is_merged());
    }

    #[test]
    fn test_merge_once() {
        let mut pr = sample();
        let at = Utc::now();
        assert!(pr.merge(at));
        assert!(pr.is_merged());
        assert_eq!(pr.merged_at, Some(at));

        let later = at + chrono::Duration::seconds(5);
        assert!(!pr.merge(later));
        assert_eq!(pr.merged_at, Some(at));
    }

    #[test]
    fn test_replace_reviewer_keeps_position() {
        let mut pr = sample();
        let slot = pr.reviewer_slot("r1").unwrap();
        let old = pr.replace_reviewer(slot, "r3");
        assert_eq!(old, "r1");
        assert_eq!(pr.reviewers, vec!["r3".to_string(), "r2".to_string()]);
        assert!(!pr.has_reviewer("r1"));
    }

    #[test]
    fn test_short_form() {
        let short = sample().short();
        assert_eq!(short.id, "pr-1");
        assert_eq!(short.author_id, "a1");
        assert_eq!(short.status, PullRequestStatus::Open);
    }
}
