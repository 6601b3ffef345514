//! SQLite schema definitions and SQL statement constants.
//!
//! Pure data, no I/O. The unique index on `(owner_id, media_id)` is the
//! sole cross-request synchronization point: concurrent creates for the
//! same pair race here, and the loser surfaces as a conflict.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
-- Owner records, upserted on first write
CREATE TABLE IF NOT EXISTS users (
    uid TEXT PRIMARY KEY,
    email TEXT,
    display_name TEXT,
    photo_url TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Tracked entries
CREATE TABLE IF NOT EXISTS tracked_entries (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    media_id INTEGER NOT NULL,
    media_kind TEXT NOT NULL,
    title TEXT NOT NULL,
    poster_path TEXT,
    status TEXT NOT NULL,
    rating INTEGER,
    notes TEXT,
    current_season INTEGER,
    current_episode INTEGER,
    total_seasons INTEGER,
    total_episodes INTEGER,
    next_air_date TEXT,
    show_status TEXT,
    watched_seconds INTEGER,
    total_duration INTEGER,
    last_watched TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (owner_id) REFERENCES users(uid) ON DELETE CASCADE
);

-- One entry per (owner, media) pair
CREATE UNIQUE INDEX IF NOT EXISTS idx_entries_owner_media
    ON tracked_entries(owner_id, media_id);

-- Indexes for efficient queries
CREATE INDEX IF NOT EXISTS idx_entries_owner ON tracked_entries(owner_id);
CREATE INDEX IF NOT EXISTS idx_entries_status ON tracked_entries(status);
"#;

/// Idempotent owner upsert. Profile fields only overwrite when the new
/// value is present; `created_at` is never touched on conflict.
pub const UPSERT_USER: &str = r#"
INSERT INTO users (uid, email, display_name, photo_url, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?5)
ON CONFLICT(uid) DO UPDATE SET
    email = COALESCE(excluded.email, users.email),
    display_name = COALESCE(excluded.display_name, users.display_name),
    photo_url = COALESCE(excluded.photo_url, users.photo_url),
    updated_at = excluded.updated_at
"#;

pub const SELECT_USER_BY_ID: &str = r#"
SELECT uid, email, display_name, photo_url, created_at, updated_at
FROM users
WHERE uid = ?1
"#;

pub const INSERT_ENTRY: &str = r#"
INSERT INTO tracked_entries (
    id, owner_id, media_id, media_kind, title, poster_path,
    status, rating, notes, current_season, current_episode, total_seasons,
    total_episodes, next_air_date, show_status, watched_seconds,
    total_duration, last_watched, created_at, updated_at
)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
"#;

pub const SELECT_ENTRY_BY_ID: &str = r#"
SELECT id, owner_id, media_id, media_kind, title, poster_path,
    status, rating, notes, current_season, current_episode, total_seasons,
    total_episodes, next_air_date, show_status, watched_seconds,
    total_duration, last_watched, created_at, updated_at
FROM tracked_entries
WHERE id = ?1
"#;

pub const SELECT_ENTRIES_BY_OWNER: &str = r#"
SELECT id, owner_id, media_id, media_kind, title, poster_path,
    status, rating, notes, current_season, current_episode, total_seasons,
    total_episodes, next_air_date, show_status, watched_seconds,
    total_duration, last_watched, created_at, updated_at
FROM tracked_entries
WHERE owner_id = ?1
"#;

/// Ownership probe used to distinguish not-found from forbidden.
pub const SELECT_ENTRY_OWNER: &str = r#"
SELECT owner_id
FROM tracked_entries
WHERE id = ?1
"#;

/// Full-row update of the mutable columns. Ownership is verified inside
/// the same transaction before this runs, so the id alone is the predicate.
pub const UPDATE_ENTRY: &str = r#"
UPDATE tracked_entries SET
    status = ?2,
    rating = ?3,
    notes = ?4,
    current_season = ?5,
    current_episode = ?6,
    total_seasons = ?7,
    total_episodes = ?8,
    next_air_date = ?9,
    show_status = ?10,
    watched_seconds = ?11,
    total_duration = ?12,
    last_watched = ?13,
    updated_at = ?14
WHERE id = ?1
"#;

pub const DELETE_ENTRY: &str = r#"
DELETE FROM tracked_entries
WHERE id = ?1 AND owner_id = ?2
"#;
