//! Domain records: pull requests, users and teams

mod pull_request;
mod user;

pub use pull_request::{ParseStatusError, PullRequest, PullRequestShort, PullRequestStatus};
pub use user::{Team, TeamMember, User};
