//! Repository modules for database operations

pub mod pull_requests;
pub mod teams;

pub use pull_requests::PullRequestRepository;
pub use teams::TeamRepository;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Error, Result};

/// Format a timestamp as RFC 3339 UTC text
pub(crate) fn encode_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn decode_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::InvalidData(format!("bad timestamp {raw:?}: {e}")))
}
