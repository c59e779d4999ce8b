//! Team and user repository

use async_trait::async_trait;
use chrono::Utc;
use roster_core::{Directory, User};
use sqlx::SqlitePool;

use super::encode_time;
use crate::Result;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    user_id: String,
    username: String,
    team_name: Option<String>,
    is_active: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.user_id,
            username: row.username,
            team_name: row.team_name,
            is_active: row.is_active,
        }
    }
}

/// Repository for teams and their members
#[derive(Clone)]
pub struct TeamRepository {
    pool: SqlitePool,
}

impl TeamRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by id
    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// List the members of a team ordered by user id
    pub async fn list_members(&self, team_name: &str) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT user_id, username, team_name, is_active FROM users
             WHERE team_name = ? ORDER BY user_id",
        )
        .bind(team_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn exists(&self, team_name: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teams WHERE team_name = ?")
            .bind(team_name)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Insert a team and upsert its members in one transaction
    pub async fn insert(&self, team_name: &str, members: &[User]) -> Result<()> {
        let now = encode_time(&Utc::now());
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO teams (team_name, created_at) VALUES (?, ?)")
            .bind(team_name)
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        for member in members {
            sqlx::query(
                r#"
                INSERT INTO users (user_id, username, team_name, is_active, created_at)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(user_id) DO UPDATE SET
                    username = excluded.username,
                    team_name = excluded.team_name,
                    is_active = excluded.is_active
                "#,
            )
            .bind(&member.id)
            .bind(&member.username)
            .bind(team_name)
            .bind(member.is_active)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(team = team_name, members = members.len(), "Inserted team");
        Ok(())
    }

    /// Update a user's active flag, returning `None` for an unknown user
    pub async fn update_active(&self, id: &str, is_active: bool) -> Result<Option<User>> {
        let result = sqlx::query("UPDATE users SET is_active = ? WHERE user_id = ?")
            .bind(is_active)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_user(id).await
    }
}

#[async_trait]
impl Directory for TeamRepository {
    async fn user_by_id(&self, id: &str) -> roster_core::Result<Option<User>> {
        Ok(self.get_user(id).await?)
    }

    async fn users_by_team(&self, team_name: &str) -> roster_core::Result<Vec<User>> {
        Ok(self.list_members(team_name).await?)
    }

    async fn team_exists(&self, team_name: &str) -> roster_core::Result<bool> {
        Ok(self.exists(team_name).await?)
    }

    async fn create_team(&self, team_name: &str, members: &[User]) -> roster_core::Result<()> {
        Ok(self.insert(team_name, members).await?)
    }

    async fn set_is_active(&self, id: &str, is_active: bool) -> roster_core::Result<Option<User>> {
        Ok(self.update_active(id, is_active).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path().join("test.db")).await.unwrap();
        (temp_dir, db)
    }

    #[tokio::test]
    async fn test_create_team_and_list_members() {
        let (_dir, db) = setup().await;
        let repo = db.teams();

        repo.create_team(
            "backend",
            &[
                User::new("u2", "Bob"),
                User::new("u1", "Alice").with_active(false),
            ],
        )
        .await
        .unwrap();

        assert!(repo.team_exists("backend").await.unwrap());
        assert!(!repo.team_exists("frontend").await.unwrap());

        let members = repo.users_by_team("backend").await.unwrap();
        let ids: Vec<&str> = members.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2"]);
        assert!(!members[0].is_active);
        assert!(members.iter().all(|u| u.team() == Some("backend")));
    }

    #[tokio::test]
    async fn test_create_team_upserts_existing_user() {
        let (_dir, db) = setup().await;
        let repo = db.teams();

        sqlx::query(
            "INSERT INTO users (user_id, username, team_name, is_active, created_at)
             VALUES ('u1', 'Old', NULL, 1, '2024-01-01T00:00:00Z')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        repo.create_team("ops", &[User::new("u1", "New")])
            .await
            .unwrap();

        let user = repo.user_by_id("u1").await.unwrap().unwrap();
        assert_eq!(user.username, "New");
        assert_eq!(user.team(), Some("ops"));
    }

    #[tokio::test]
    async fn test_duplicate_team_rolls_back() {
        let (_dir, db) = setup().await;
        let repo = db.teams();

        repo.create_team("backend", &[]).await.unwrap();
        let err = repo
            .create_team("backend", &[User::new("u9", "Late")])
            .await
            .unwrap_err();
        assert!(matches!(err, roster_core::Error::Storage(_)));
        assert!(repo.user_by_id("u9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_is_active() {
        let (_dir, db) = setup().await;
        let repo = db.teams();
        repo.create_team("backend", &[User::new("u1", "Alice")])
            .await
            .unwrap();

        let user = repo.set_is_active("u1", false).await.unwrap().unwrap();
        assert!(!user.is_active);
        assert!(repo.set_is_active("ghost", false).await.unwrap().is_none());
    }
}
