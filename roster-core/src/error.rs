//! Error types for roster

use std::fmt;

use thiserror::Error;

/// Result type alias for roster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error raised by a storage collaborator
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The kind of entity a lookup failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    PullRequest,
    User,
    Team,
    /// A user exists but has no team assigned
    Membership,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::PullRequest => "pull request",
            Entity::User => "user",
            Entity::Team => "team",
            Entity::Membership => "team of user",
        };
        f.write_str(name)
    }
}

/// Externally observable error code
///
/// Several internal variants collapse onto the same code; every missing entity
/// is reported as `NOT_FOUND` regardless of what was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    PrExists,
    NotFound,
    PrMerged,
    NotAssigned,
    NoCandidate,
    TeamExists,
    UserExists,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::PrExists => "PR_EXISTS",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::PrMerged => "PR_MERGED",
            ErrorCode::NotAssigned => "NOT_ASSIGNED",
            ErrorCode::NoCandidate => "NO_CANDIDATE",
            ErrorCode::TeamExists => "TEAM_EXISTS",
            ErrorCode::UserExists => "USER_EXISTS",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for roster operations
#[derive(Error, Debug)]
pub enum Error {
    /// A pull request with this id already exists
    #[error("pull request {0} already exists")]
    PrExists(String),

    /// Referenced pull request, user or team does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },

    /// Mutation attempted on a merged pull request
    #[error("cannot reassign on merged pull request {0}")]
    PrMerged(String),

    /// Reassignment target is not a current reviewer
    #[error("reviewer {reviewer_id} is not assigned to pull request {pr_id}")]
    NotAssigned { pr_id: String, reviewer_id: String },

    /// No eligible replacement reviewer exists
    #[error("no active replacement candidate in team {0}")]
    NoCandidate(String),

    /// Team creation attempted with a duplicate name
    #[error("team {0} already exists")]
    TeamExists(String),

    /// User already belongs to a team
    #[error("user {user_id} already belongs to team {team_name}")]
    UserExists { user_id: String, team_name: String },

    /// The caller cancelled the operation while it awaited a collaborator
    #[error("operation cancelled")]
    Cancelled,

    /// Failure reported by a storage collaborator, carried unchanged
    #[error("Storage error: {0}")]
    Storage(#[source] BoxError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn storage(err: impl Into<BoxError>) -> Self {
        Self::Storage(err.into())
    }

    /// Domain code for this error, `None` for internal failures
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::PrExists(_) => Some(ErrorCode::PrExists),
            Error::NotFound { .. } => Some(ErrorCode::NotFound),
            Error::PrMerged(_) => Some(ErrorCode::PrMerged),
            Error::NotAssigned { .. } => Some(ErrorCode::NotAssigned),
            Error::NoCandidate(_) => Some(ErrorCode::NoCandidate),
            Error::TeamExists(_) => Some(ErrorCode::TeamExists),
            Error::UserExists { .. } => Some(ErrorCode::UserExists),
            Error::Cancelled | Error::Storage(_) | Error::Config(_) | Error::Io(_) => None,
        }
    }
}
