//! Roster Core - reviewer assignment for pull requests
//!
//! This crate holds the domain model, the reviewer selection algorithm, the
//! pull-request lifecycle engine and the persistence traits it depends on.
//! Storage backends and transports live in sibling crates.

pub mod config;
pub mod error;
pub mod model;
pub mod selection;
pub mod service;
pub mod store;

pub use config::{Config, ConfigOverrides};
pub use error::{Entity, Error, ErrorCode, Result};
pub use model::{PullRequest, PullRequestShort, PullRequestStatus, Team, TeamMember, User};
pub use selection::{ReviewerPicker, REVIEWERS_PER_PR};
pub use service::{PullRequestService, Reassignment, Services, TeamService, UserService};
pub use store::{Directory, InMemoryStore, PullRequestStore};
