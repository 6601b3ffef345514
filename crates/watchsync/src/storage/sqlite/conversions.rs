//! Row and value conversions between domain types and SQLite.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;

use watchsync_core::media::{MediaKind, TrackedEntry, UserRecord, WatchStatus};

/// Formats a timestamp for TEXT column storage.
pub fn format_datetime(at: &DateTime<Utc>) -> String {
    at.to_rfc3339()
}

/// Formats a date for TEXT column storage.
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn conversion_failure(index: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        rusqlite::types::Type::Text,
        message.into(),
    )
}

fn parse_datetime(index: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_failure(index, format!("invalid timestamp {value:?}: {e}")))
}

fn parse_date(index: usize, value: String) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .map_err(|e| conversion_failure(index, format!("invalid date {value:?}: {e}")))
}

pub fn kind_to_string(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Movie => "movie",
        MediaKind::Series => "series",
    }
}

fn parse_kind(index: usize, value: String) -> rusqlite::Result<MediaKind> {
    match value.as_str() {
        "movie" => Ok(MediaKind::Movie),
        "series" => Ok(MediaKind::Series),
        other => Err(conversion_failure(
            index,
            format!("unknown media kind {other:?}"),
        )),
    }
}

fn parse_status(index: usize, value: String) -> rusqlite::Result<WatchStatus> {
    WatchStatus::parse(&value)
        .ok_or_else(|| conversion_failure(index, format!("unknown watch status {value:?}")))
}

/// Maps a `tracked_entries` row (selected in column order) to a domain
/// entry.
pub fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<TrackedEntry> {
    Ok(TrackedEntry {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        media_id: row.get(2)?,
        media_kind: parse_kind(3, row.get(3)?)?,
        title: row.get(4)?,
        poster_path: row.get(5)?,
        status: parse_status(6, row.get(6)?)?,
        rating: row.get(7)?,
        notes: row.get(8)?,
        current_season: row.get(9)?,
        current_episode: row.get(10)?,
        total_seasons: row.get(11)?,
        total_episodes: row.get(12)?,
        next_air_date: row
            .get::<_, Option<String>>(13)?
            .map(|v| parse_date(13, v))
            .transpose()?,
        show_status: row.get(14)?,
        watched_seconds: row.get(15)?,
        total_duration: row.get(16)?,
        last_watched: row
            .get::<_, Option<String>>(17)?
            .map(|v| parse_datetime(17, v))
            .transpose()?,
        created_at: parse_datetime(18, row.get(18)?)?,
        updated_at: parse_datetime(19, row.get(19)?)?,
    })
}

/// Maps a `users` row to an owner record.
pub fn row_to_user(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        uid: row.get(0)?,
        email: row.get(1)?,
        display_name: row.get(2)?,
        photo_url: row.get(3)?,
        created_at: parse_datetime(4, row.get(4)?)?,
        updated_at: parse_datetime(5, row.get(5)?)?,
    })
}
