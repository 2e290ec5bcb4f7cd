//! Query modules. Each takes a borrowed `Connection` so the engine decides
//! which connection (writer or reader) runs it.

pub mod contradiction_ops;
pub mod event_ops;
pub mod memory_ops;
pub mod pending_ops;

use chrono::{DateTime, SecondsFormat, Utc};

use somnus_core::errors::{SomnusResult, StorageError};

/// Fixed-width RFC 3339 so timestamps compare correctly as text.
pub(crate) fn fmt_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(table: &'static str, raw: &str) -> SomnusResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            StorageError::CorruptRow {
                table,
                details: format!("bad timestamp {raw:?}: {e}"),
            }
            .into()
        })
}

pub(crate) fn parse_opt_ts(
    table: &'static str,
    raw: Option<String>,
) -> SomnusResult<Option<DateTime<Utc>>> {
    raw.map(|s| parse_ts(table, &s)).transpose()
}

/// Parse a stored enum label, reporting the row as corrupt on failure.
pub(crate) fn parse_label<T>(
    table: &'static str,
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> SomnusResult<T> {
    parse(raw).ok_or_else(|| {
        StorageError::CorruptRow {
            table,
            details: format!("unknown label {raw:?}"),
        }
        .into()
    })
}

pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(
    table: &'static str,
    raw: &str,
) -> SomnusResult<T> {
    serde_json::from_str(raw).map_err(|e| {
        StorageError::CorruptRow {
            table,
            details: e.to_string(),
        }
        .into()
    })
}
