//! Users and teams

use serde::{Deserialize, Serialize};

/// A user known to the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,

    pub username: String,

    /// Team the user belongs to; `None` means no team
    pub team_name: Option<String>,

    /// Inactive users are never picked as reviewers
    pub is_active: bool,
}

impl User {
    /// Create an active user without a team
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            team_name: None,
            is_active: true,
        }
    }

    /// Set the team for this user
    pub fn with_team(mut self, team_name: impl Into<String>) -> Self {
        self.team_name = Some(team_name.into());
        self
    }

    /// Set the active flag for this user
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn team(&self) -> Option<&str> {
        self.team_name.as_deref().filter(|t| !t.is_empty())
    }
}

/// Member entry supplied when a team is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

impl TeamMember {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, is_active: bool) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            is_active,
        }
    }

    /// Turn the entry into a user record belonging to `team_name`
    pub fn into_user(self, team_name: &str) -> User {
        User {
            id: self.user_id,
            username: self.username,
            team_name: Some(team_name.to_string()),
            is_active: self.is_active,
        }
    }
}

/// A team and its resolved members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub members: Vec<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_builders() {
        let user = User::new("u1", "Alice").with_team("backend").with_active(false);
        assert_eq!(user.team(), Some("backend"));
        assert!(!user.is_active);
    }

    #[test]
    fn test_empty_team_name_means_no_team() {
        let user = User::new("u1", "Alice").with_team("");
        assert_eq!(user.team(), None);
        assert_eq!(User::new("u2", "Bob").team(), None);
    }

    #[test]
    fn test_member_into_user() {
        let user = TeamMember::new("u1", "Alice", true).into_user("payments");
        assert_eq!(user.id, "u1");
        assert_eq!(user.team_name.as_deref(), Some("payments"));
        assert!(user.is_active);
    }
}
