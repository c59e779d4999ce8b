//! In-memory implementation of the persistence collaborators.
//!
//! All state is held in memory and lost on drop. Used by tests and by
//! `roster serve --in-memory`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Directory, PullRequestStore};
use crate::model::{PullRequest, User};
use crate::{Error, Result};

/// In-memory directory and pull request store.
///
/// Each map sits behind its own `RwLock`; a pull request and its reviewers
/// live in one value, so create and update are trivially atomic.
#[derive(Default)]
pub struct InMemoryStore {
    teams: RwLock<BTreeSet<String>>,
    users: RwLock<BTreeMap<String, User>>,
    prs: RwLock<BTreeMap<String, PullRequest>>,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a storage error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Insert or replace a user without touching teams.
    pub async fn put_user(&self, user: User) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::storage(std::io::Error::new(
                std::io::ErrorKind::Other,
                "in-memory store rejected write",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Directory for InMemoryStore {
    async fn user_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn users_by_team(&self, team_name: &str) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| u.team_name.as_deref() == Some(team_name))
            .cloned()
            .collect())
    }

    async fn team_exists(&self, team_name: &str) -> Result<bool> {
        Ok(self.teams.read().await.contains(team_name))
    }

    async fn create_team(&self, team_name: &str, members: &[User]) -> Result<()> {
        self.check_writable()?;
        let mut teams = self.teams.write().await;
        let mut users = self.users.write().await;
        teams.insert(team_name.to_string());
        for member in members {
            let mut user = member.clone();
            user.team_name = Some(team_name.to_string());
            users.insert(user.id.clone(), user);
        }
        Ok(())
    }

    async fn set_is_active(&self, id: &str, is_active: bool) -> Result<Option<User>> {
        self.check_writable()?;
        let mut users = self.users.write().await;
        Ok(users.get_mut(id).map(|user| {
            user.is_active = is_active;
            user.clone()
        }))
    }
}

#[async_trait]
impl PullRequestStore for InMemoryStore {
    async fn pr_exists(&self, id: &str) -> Result<bool> {
        Ok(self.prs.read().await.contains_key(id))
    }

    async fn create_pr(&self, pr: &PullRequest) -> Result<()> {
        self.check_writable()?;
        let mut prs = self.prs.write().await;
        if prs.contains_key(&pr.id) {
            return Err(Error::storage(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("duplicate pull request id {}", pr.id),
            )));
        }
        prs.insert(pr.id.clone(), pr.clone());
        Ok(())
    }

    async fn pr_by_id(&self, id: &str) -> Result<Option<PullRequest>> {
        Ok(self.prs.read().await.get(id).cloned())
    }

    async fn update_pr(&self, pr: &PullRequest) -> Result<()> {
        self.check_writable()?;
        let mut prs = self.prs.write().await;
        match prs.get_mut(&pr.id) {
            Some(stored) => {
                *stored = pr.clone();
                Ok(())
            }
            None => Err(Error::storage(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("update of unknown pull request {}", pr.id),
            ))),
        }
    }

    async fn prs_by_ids(&self, ids: &[String]) -> Result<Vec<PullRequest>> {
        let prs = self.prs.read().await;
        Ok(ids.iter().filter_map(|id| prs.get(id).cloned()).collect())
    }

    async fn pr_ids_by_reviewer(&self, user_id: &str) -> Result<Vec<String>> {
        let prs = self.prs.read().await;
        Ok(prs
            .values()
            .filter(|pr| pr.has_reviewer(user_id))
            .map(|pr| pr.id.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_create_team_sets_membership() {
        let store = InMemoryStore::new();
        store
            .create_team("backend", &[User::new("u1", "Alice"), User::new("u2", "Bob")])
            .await
            .unwrap();

        assert!(store.team_exists("backend").await.unwrap());
        let members = store.users_by_team("backend").await.unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|u| u.team() == Some("backend")));
    }

    #[tokio::test]
    async fn test_set_is_active_unknown_user() {
        let store = InMemoryStore::new();
        assert!(store.set_is_active("ghost", false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pr_round_trip_and_reviewer_index() {
        let store = InMemoryStore::new();
        let mut pr = PullRequest::open("pr-1", "Add X", "a1", vec!["r1".into()], Utc::now());
        store.create_pr(&pr).await.unwrap();
        assert!(store.pr_exists("pr-1").await.unwrap());

        pr.reviewers = vec!["r2".into()];
        store.update_pr(&pr).await.unwrap();

        assert!(store.pr_ids_by_reviewer("r1").await.unwrap().is_empty());
        assert_eq!(store.pr_ids_by_reviewer("r2").await.unwrap(), vec!["pr-1"]);

        let fetched = store
            .prs_by_ids(&["pr-1".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(fetched, vec![pr]);
    }

    #[tokio::test]
    async fn test_failing_writes() {
        let store = InMemoryStore::new();
        store.set_fail_writes(true);
        let pr = PullRequest::open("pr-1", "Add X", "a1", vec![], Utc::now());
        let err = store.create_pr(&pr).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(!store.pr_exists("pr-1").await.unwrap());
    }
}
