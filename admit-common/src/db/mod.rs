//! Database schema and queries
//!
//! Timestamps are stored as RFC 3339 TEXT; ids are UUID strings.

pub mod assessments;
pub mod init;
pub mod progress;
pub mod responses;
pub mod settings;
pub mod trainees;

pub use init::{create_schema, init_database};

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// Parse a stored RFC 3339 timestamp
pub(crate) fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
}

/// Parse an optional stored RFC 3339 timestamp
pub(crate) fn parse_optional_timestamp(
    column: &str,
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>> {
    value.map(|s| parse_timestamp(column, &s)).transpose()
}
