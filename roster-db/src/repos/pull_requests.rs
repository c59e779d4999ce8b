//! Pull request repository
//!
//! A pull request is one row in `pull_requests` plus one row per reviewer in
//! `pr_reviewers`. Reviewer order is kept in the `position` column.

use async_trait::async_trait;
use roster_core::{PullRequest, PullRequestStatus, PullRequestStore};
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{decode_time, encode_time};
use crate::{Error, Result};

#[derive(Debug, sqlx::FromRow)]
struct PullRequestRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
    created_at: String,
    merged_at: Option<String>,
}

impl PullRequestRow {
    fn into_model(self, reviewers: Vec<String>) -> Result<PullRequest> {
        let status: PullRequestStatus = self
            .status
            .parse()
            .map_err(|e| Error::InvalidData(format!("pull request {}: {e}", self.pull_request_id)))?;

        Ok(PullRequest {
            status,
            reviewers,
            created_at: decode_time(&self.created_at)?,
            merged_at: self.merged_at.as_deref().map(decode_time).transpose()?,
            id: self.pull_request_id,
            name: self.pull_request_name,
            author_id: self.author_id,
        })
    }
}

/// Repository for pull requests and their reviewer assignments
#[derive(Clone)]
pub struct PullRequestRepository {
    pool: SqlitePool,
}

impl PullRequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, id: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pull_requests WHERE pull_request_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    /// Insert a pull request and its reviewers in one transaction
    pub async fn insert(&self, pr: &PullRequest) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO pull_requests (
                pull_request_id, pull_request_name, author_id, status, created_at, merged_at
            )
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&pr.id)
        .bind(&pr.name)
        .bind(&pr.author_id)
        .bind(pr.status.as_str())
        .bind(encode_time(&pr.created_at))
        .bind(pr.merged_at.as_ref().map(encode_time))
        .execute(&mut *tx)
        .await?;

        Self::write_reviewers(&mut tx, pr).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Get a pull request with its reviewers in assignment order
    pub async fn get_by_id(&self, id: &str) -> Result<Option<PullRequest>> {
        let row = sqlx::query_as::<_, PullRequestRow>(
            r#"
            SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at
            FROM pull_requests
            WHERE pull_request_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let reviewers: Vec<String> = sqlx::query_scalar(
            "SELECT user_id FROM pr_reviewers WHERE pull_request_id = ? ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        row.into_model(reviewers).map(Some)
    }

    /// Replace the mutable fields and the reviewer rows in one transaction
    pub async fn update(&self, pr: &PullRequest) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE pull_requests
            SET pull_request_name = ?, status = ?, merged_at = ?
            WHERE pull_request_id = ?
            "#,
        )
        .bind(&pr.name)
        .bind(pr.status.as_str())
        .bind(pr.merged_at.as_ref().map(encode_time))
        .bind(&pr.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("pull request {}", pr.id)));
        }

        sqlx::query("DELETE FROM pr_reviewers WHERE pull_request_id = ?")
            .bind(&pr.id)
            .execute(&mut *tx)
            .await?;

        Self::write_reviewers(&mut tx, pr).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Get every pull request in `ids`, skipping unknown ids
    pub async fn get_many(&self, ids: &[String]) -> Result<Vec<PullRequest>> {
        let mut prs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(pr) = self.get_by_id(id).await? {
                prs.push(pr);
            }
        }
        Ok(prs)
    }

    /// Ids of pull requests reviewed by `user_id`, ordered by id
    pub async fn ids_by_reviewer(&self, user_id: &str) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar(
            "SELECT pull_request_id FROM pr_reviewers WHERE user_id = ? ORDER BY pull_request_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn write_reviewers(tx: &mut Transaction<'_, Sqlite>, pr: &PullRequest) -> Result<()> {
        for (position, reviewer) in pr.reviewers.iter().enumerate() {
            sqlx::query(
                "INSERT INTO pr_reviewers (pull_request_id, user_id, position) VALUES (?, ?, ?)",
            )
            .bind(&pr.id)
            .bind(reviewer)
            .bind(position as i64)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl PullRequestStore for PullRequestRepository {
    async fn pr_exists(&self, id: &str) -> roster_core::Result<bool> {
        Ok(self.exists(id).await?)
    }

    async fn create_pr(&self, pr: &PullRequest) -> roster_core::Result<()> {
        Ok(self.insert(pr).await?)
    }

    async fn pr_by_id(&self, id: &str) -> roster_core::Result<Option<PullRequest>> {
        Ok(self.get_by_id(id).await?)
    }

    async fn update_pr(&self, pr: &PullRequest) -> roster_core::Result<()> {
        Ok(self.update(pr).await?)
    }

    async fn prs_by_ids(&self, ids: &[String]) -> roster_core::Result<Vec<PullRequest>> {
        Ok(self.get_many(ids).await?)
    }

    async fn pr_ids_by_reviewer(&self, user_id: &str) -> roster_core::Result<Vec<String>> {
        Ok(self.ids_by_reviewer(user_id).await?)
    }
}
