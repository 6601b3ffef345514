//! SQLite storage backend.
//!
//! Every write runs as one transaction: the idempotent owner upsert plus
//! the actual mutation. Domain failures raised inside a transaction travel
//! out through `domain_err`/`map_store_error` so they keep their taxonomy.

use async_trait::async_trait;
use chrono::Utc;
use tokio_rusqlite::Connection;

use watchsync_core::auth::UserIdentity;
use watchsync_core::media::{
    sorting::apply_filter, EntryPatch, NewEntry, TrackedEntry, UserRecord,
};
use watchsync_core::storage::{
    EntryStore, ListFilter, RepositoryError, Result, UserStore,
};

use super::conversions::{
    format_date, format_datetime, kind_to_string, row_to_entry, row_to_user,
};
use super::error::{domain_err, is_unique_violation, map_store_error, wrap_err};
use super::schema;

/// SQLite-based storage backend.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates a new store with a file-based database.
    ///
    /// The database file is created if it doesn't exist; schema tables are
    /// created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new store with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

/// Idempotent owner upsert, executed inside every write transaction.
fn upsert_user(
    tx: &rusqlite::Transaction<'_>,
    owner: &UserIdentity,
) -> std::result::Result<(), tokio_rusqlite::Error> {
    tx.execute(
        schema::UPSERT_USER,
        rusqlite::params![
            owner.uid,
            owner.email,
            owner.display_name,
            owner.picture_url,
            format_datetime(&Utc::now()),
        ],
    )
    .map_err(wrap_err)?;
    Ok(())
}

#[async_trait]
impl EntryStore for SqliteStore {
    async fn create_entry(&self, owner: &UserIdentity, new: &NewEntry) -> Result<TrackedEntry> {
        let entry = TrackedEntry::new(owner.uid.clone(), &new.media, new.status);
        let owner = owner.clone();
        let row = entry.clone();

        let result = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                upsert_user(&tx, &owner)?;
                tx.execute(
                    schema::INSERT_ENTRY,
                    rusqlite::params![
                        row.id,
                        row.owner_id,
                        row.media_id,
                        kind_to_string(row.media_kind),
                        row.title,
                        row.poster_path,
                        row.status.as_str(),
                        row.rating,
                        row.notes,
                        row.current_season,
                        row.current_episode,
                        row.total_seasons,
                        row.total_episodes,
                        row.next_air_date.map(|d| format_date(&d)),
                        row.show_status,
                        row.watched_seconds,
                        row.total_duration,
                        row.last_watched.map(|t| format_datetime(&t)),
                        format_datetime(&row.created_at),
                        format_datetime(&row.updated_at),
                    ],
                )
                .map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;
                Ok(())
            })
            .await;

        match result {
            Ok(()) => {
                tracing::debug!(entry_id = %entry.id, owner_id = %entry.owner_id, "entry created");
                Ok(entry)
            }
            Err(e) if is_unique_violation(&e) => Err(RepositoryError::AlreadyTracked {
                owner_id: entry.owner_id,
                media_id: entry.media_id,
            }),
            Err(e) => Err(map_store_error(e, "TrackedEntry", entry.id)),
        }
    }

    async fn update_entry(
        &self,
        entry_id: &str,
        owner: &UserIdentity,
        patch: &EntryPatch,
    ) -> Result<TrackedEntry> {
        let id = entry_id.to_string();
        let owner = owner.clone();
        let patch = patch.clone();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                upsert_user(&tx, &owner)?;

                let mut entry = {
                    let mut stmt = tx.prepare(schema::SELECT_ENTRY_BY_ID).map_err(wrap_err)?;
                    match stmt.query_row([&id], row_to_entry) {
                        Ok(entry) => entry,
                        Err(rusqlite::Error::QueryReturnedNoRows) => {
                            return Err(domain_err(RepositoryError::NotFound {
                                entity_type: "TrackedEntry",
                                id: id.clone(),
                            }))
                        }
                        Err(e) => return Err(wrap_err(e)),
                    }
                };
                if entry.owner_id != owner.uid {
                    return Err(domain_err(RepositoryError::Forbidden {
                        entity_type: "TrackedEntry",
                        id: id.clone(),
                    }));
                }

                patch.apply(&mut entry);
                entry.updated_at = Utc::now();

                tx.execute(
                    schema::UPDATE_ENTRY,
                    rusqlite::params![
                        entry.id,
                        entry.status.as_str(),
                        entry.rating,
                        entry.notes,
                        entry.current_season,
                        entry.current_episode,
                        entry.total_seasons,
                        entry.total_episodes,
                        entry.next_air_date.map(|d| format_date(&d)),
                        entry.show_status,
                        entry.watched_seconds,
                        entry.total_duration,
                        entry.last_watched.map(|t| format_datetime(&t)),
                        format_datetime(&entry.updated_at),
                    ],
                )
                .map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;
                Ok(entry)
            })
            .await
            .map_err(|e| map_store_error(e, "TrackedEntry", entry_id.to_string()))
    }

    async fn delete_entry(&self, entry_id: &str, owner: &UserIdentity) -> Result<()> {
        let id = entry_id.to_string();
        let owner = owner.clone();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                upsert_user(&tx, &owner)?;

                let current_owner: Option<String> = {
                    let mut stmt = tx.prepare(schema::SELECT_ENTRY_OWNER).map_err(wrap_err)?;
                    match stmt.query_row([&id], |row| row.get(0)) {
                        Ok(uid) => Some(uid),
                        Err(rusqlite::Error::QueryReturnedNoRows) => None,
                        Err(e) => return Err(wrap_err(e)),
                    }
                };
                match current_owner {
                    None => {
                        return Err(domain_err(RepositoryError::NotFound {
                            entity_type: "TrackedEntry",
                            id: id.clone(),
                        }))
                    }
                    Some(uid) if uid != owner.uid => {
                        return Err(domain_err(RepositoryError::Forbidden {
                            entity_type: "TrackedEntry",
                            id: id.clone(),
                        }))
                    }
                    Some(_) => {}
                }

                tx.execute(schema::DELETE_ENTRY, rusqlite::params![id, owner.uid])
                    .map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_store_error(e, "TrackedEntry", entry_id.to_string()))
    }

    async fn list_entries(&self, owner_id: &str, filter: &ListFilter) -> Result<Vec<TrackedEntry>> {
        let owner = owner_id.to_string();

        let entries = self
            .conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_ENTRIES_BY_OWNER)
                    .map_err(wrap_err)?;
                let rows = stmt.query_map([&owner], row_to_entry).map_err(wrap_err)?;

                let mut entries = Vec::new();
                for row in rows {
                    entries.push(row.map_err(wrap_err)?);
                }
                Ok(entries)
            })
            .await
            .map_err(|e| map_store_error(e, "TrackedEntry", owner_id.to_string()))?;

        Ok(apply_filter(entries, filter))
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn get_user(&self, uid: &str) -> Result<Option<UserRecord>> {
        let id = uid.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_USER_BY_ID).map_err(wrap_err)?;
                match stmt.query_row([&id], row_to_user) {
                    Ok(user) => Ok(Some(user)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_store_error(e, "User", uid.to_string()))
    }
}
