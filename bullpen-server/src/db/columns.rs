//! Conversions between SQLite column values and domain types.
//!
//! Ids are stored as TEXT uuids, timestamps as RFC 3339 text with fixed
//! microsecond precision, and string lists as JSON arrays.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

use bullpen_types::UserSummary;

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

/// Format a timestamp the way every table stores it
pub fn to_db_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn to_db_json(values: &Option<Vec<String>>) -> Option<String> {
    values
        .as_ref()
        .map(|v| serde_json::Value::from(v.clone()).to_string())
}

pub fn uuid_at(row: &Row, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

pub fn opt_uuid_at(row: &Row, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

pub fn time_at(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    raw.parse::<DateTime<Utc>>()
        .map_err(|e| conversion_error(idx, e))
}

pub fn opt_time_at(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| s.parse::<DateTime<Utc>>().map_err(|e| conversion_error(idx, e)))
        .transpose()
}

pub fn json_list_at(row: &Row, idx: usize) -> rusqlite::Result<Option<Vec<String>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| serde_json::from_str::<Vec<String>>(&s).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

pub fn count_at(row: &Row, idx: usize) -> rusqlite::Result<u64> {
    let n: i64 = row.get(idx)?;
    Ok(n.max(0) as u64)
}

/// Columns read by [`summary_at`], prefixed with the `users` alias `u`
pub const USER_SUMMARY_COLUMNS: &str = "u.id, u.username, u.display_name, u.profile_picture_url, u.badge";

/// Read a [`UserSummary`] from five consecutive columns starting at `start`
pub fn summary_at(row: &Row, start: usize) -> rusqlite::Result<UserSummary> {
    Ok(UserSummary {
        id: uuid_at(row, start)?,
        username: row.get(start + 1)?,
        display_name: row.get(start + 2)?,
        profile_picture_url: row.get(start + 3)?,
        badge: row.get(start + 4)?,
    })
}
