//! Request and response bodies

use chrono::{DateTime, Utc};
use roster_core::{PullRequest, PullRequestShort, PullRequestStatus, Team, TeamMember, User};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct CreatePullRequestRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MergePullRequestRequest {
    pub pull_request_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    pub pull_request_id: String,
    #[serde(alias = "old_user_id")]
    pub old_reviewer_id: String,
}

/// Full pull request as returned by the API
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequestDto {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
    pub assigned_reviewers: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "mergedAt", default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
}

impl From<PullRequest> for PullRequestDto {
    fn from(pr: PullRequest) -> Self {
        Self {
            pull_request_id: pr.id,
            pull_request_name: pr.name,
            author_id: pr.author_id,
            status: pr.status,
            assigned_reviewers: pr.reviewers,
            created_at: pr.created_at,
            merged_at: pr.merged_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PullRequestResponse {
    pub pr: PullRequestDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReassignResponse {
    pub pr: PullRequestDto,
    pub replaced_by: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequestShortDto {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
}

impl From<PullRequestShort> for PullRequestShortDto {
    fn from(pr: PullRequestShort) -> Self {
        Self {
            pull_request_id: pr.id,
            pull_request_name: pr.name,
            author_id: pr.author_id,
            status: pr.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TeamMemberDto {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub is_active: bool,
}

impl From<TeamMemberDto> for TeamMember {
    fn from(dto: TeamMemberDto) -> Self {
        TeamMember::new(dto.user_id, dto.username, dto.is_active)
    }
}

impl From<User> for TeamMemberDto {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TeamDto {
    pub team_name: String,
    pub members: Vec<TeamMemberDto>,
}

impl From<Team> for TeamDto {
    fn from(team: Team) -> Self {
        Self {
            team_name: team.name,
            members: team.members.into_iter().map(TeamMemberDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TeamResponse {
    pub team: TeamDto,
}

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    pub team_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetIsActiveRequest {
    pub user_id: String,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserDto {
    pub user_id: String,
    pub username: String,
    pub team_name: Option<String>,
    pub is_active: bool,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            team_name: user.team_name,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: UserDto,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserReviewsResponse {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShortDto>,
}
