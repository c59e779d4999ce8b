//! CLI command implementations

pub mod pr;
pub mod serve;
pub mod team;
pub mod user;

pub use pr::PrArgs;
pub use serve::ServeArgs;
pub use team::TeamArgs;
pub use user::UserArgs;

use std::sync::Arc;

use roster_core::{Config, PullRequest, ReviewerPicker, Services};
use roster_db::Database;

/// Open the configured database and wire the services to it
pub async fn open_services(config: &Config) -> anyhow::Result<(Database, Services)> {
    let db = Database::connect(&config.database).await?;
    let services = Services::new(
        Arc::new(db.teams()),
        Arc::new(db.pull_requests()),
        ReviewerPicker::from_seed(config.assignment.seed),
    );
    Ok((db, services))
}

/// Print a pull request in the CLI's plain layout
pub fn print_pull_request(pr: &PullRequest) {
    println!("{} [{}] {}", pr.id, pr.status, pr.name);
    println!("  author: {}", pr.author_id);
    if pr.reviewers.is_empty() {
        println!("  reviewers: (none)");
    } else {
        println!("  reviewers: {}", pr.reviewers.join(", "));
    }
    println!("  created: {}", pr.created_at.to_rfc3339());
    if let Some(merged_at) = pr.merged_at {
        println!("  merged: {}", merged_at.to_rfc3339());
    }
}
