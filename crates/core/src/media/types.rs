use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of media an entry tracks.
///
/// Movies are tracked by watched duration; series carry season/episode
/// progress and airing metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    /// Returns true if this kind carries season/episode progress.
    pub fn is_series(&self) -> bool {
        matches!(self, MediaKind::Series)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Series => write!(f, "series"),
        }
    }
}

/// Watch status of a tracked entry.
///
/// Declaration order is the list sort order: active-ish statuses first,
/// abandoned last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WatchStatus {
    PlanToWatch,
    Watching,
    Watched,
    OnHold,
    Dropped,
}

impl WatchStatus {
    /// Sort rank used by list ordering. Lower ranks appear first.
    pub fn sort_rank(&self) -> u8 {
        match self {
            WatchStatus::PlanToWatch => 0,
            WatchStatus::Watching => 1,
            WatchStatus::Watched => 2,
            WatchStatus::OnHold => 3,
            WatchStatus::Dropped => 4,
        }
    }

    /// Stable string form used in persisted rows and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::PlanToWatch => "PLAN_TO_WATCH",
            WatchStatus::Watching => "WATCHING",
            WatchStatus::Watched => "WATCHED",
            WatchStatus::OnHold => "ON_HOLD",
            WatchStatus::Dropped => "DROPPED",
        }
    }

    /// Parses the persisted string form back into a status.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PLAN_TO_WATCH" => Some(WatchStatus::PlanToWatch),
            "WATCHING" => Some(WatchStatus::Watching),
            "WATCHED" => Some(WatchStatus::Watched),
            "ON_HOLD" => Some(WatchStatus::OnHold),
            "DROPPED" => Some(WatchStatus::Dropped),
            _ => None,
        }
    }
}

impl std::fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference to an external media item, captured at add time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    /// External catalog id.
    pub id: i64,
    pub kind: MediaKind,
    pub title: String,
    pub poster_path: Option<String>,
}

impl MediaRef {
    pub fn new(id: i64, kind: MediaKind, title: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            poster_path: None,
        }
    }

    pub fn with_poster(mut self, poster_path: impl Into<String>) -> Self {
        self.poster_path = Some(poster_path.into());
        self
    }
}

/// Payload for creating a tracked entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub media: MediaRef,
    pub status: WatchStatus,
}

impl NewEntry {
    pub fn new(media: MediaRef, status: WatchStatus) -> Self {
        Self { media, status }
    }
}

/// One user's tracking record for one media item.
///
/// Uniqueness invariant: at most one entry per `(owner_id, media_id)` pair,
/// enforced by the store layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedEntry {
    /// Opaque, server-assigned, immutable id.
    pub id: String,
    /// Stable identity of the owning user.
    pub owner_id: String,
    pub media_id: i64,
    pub media_kind: MediaKind,
    pub title: String,
    pub poster_path: Option<String>,
    pub status: WatchStatus,
    /// Bounded 0..=10.
    pub rating: Option<u8>,
    pub notes: Option<String>,
    /// Season/episode progress. Only meaningful for series.
    pub current_season: Option<u32>,
    pub current_episode: Option<u32>,
    pub total_seasons: Option<u32>,
    pub total_episodes: Option<u32>,
    pub next_air_date: Option<NaiveDate>,
    pub show_status: Option<String>,
    /// Playback progress. Only meaningful for movies.
    pub watched_seconds: Option<u32>,
    pub total_duration: Option<u32>,
    /// Last-activity timestamp.
    pub last_watched: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrackedEntry {
    /// Creates a new entry with a freshly assigned id and current timestamps.
    pub fn new(owner_id: impl Into<String>, media: &MediaRef, status: WatchStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            media_id: media.id,
            media_kind: media.kind,
            title: media.title.clone(),
            poster_path: media.poster_path.clone(),
            status,
            rating: None,
            notes: None,
            current_season: None,
            current_episode: None,
            total_seasons: None,
            total_episodes: None,
            next_air_date: None,
            show_status: None,
            watched_seconds: None,
            total_duration: None,
            last_watched: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets a specific id (useful for testing).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_status(mut self, status: WatchStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn with_updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = at;
        self
    }
}

/// Partial update for a tracked entry.
///
/// `None` fields are left untouched. The same patch type is applied by the
/// store and by the client's speculative apply, so both sides agree on what
/// an update means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WatchStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_episode: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_seasons: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_episodes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_air_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watched_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_watched: Option<DateTime<Utc>>,
}

impl EntryPatch {
    pub fn status(status: WatchStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_progress(mut self, season: u32, episode: u32) -> Self {
        self.current_season = Some(season);
        self.current_episode = Some(episode);
        self
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies every set field onto `entry`. Does not touch `updated_at`;
    /// bumping it is the writer's responsibility.
    pub fn apply(&self, entry: &mut TrackedEntry) {
        if let Some(status) = self.status {
            entry.status = status;
        }
        if let Some(rating) = self.rating {
            entry.rating = Some(rating);
        }
        if let Some(ref notes) = self.notes {
            entry.notes = Some(notes.clone());
        }
        if let Some(season) = self.current_season {
            entry.current_season = Some(season);
        }
        if let Some(episode) = self.current_episode {
            entry.current_episode = Some(episode);
        }
        if let Some(seasons) = self.total_seasons {
            entry.total_seasons = Some(seasons);
        }
        if let Some(episodes) = self.total_episodes {
            entry.total_episodes = Some(episodes);
        }
        if let Some(date) = self.next_air_date {
            entry.next_air_date = Some(date);
        }
        if let Some(ref show_status) = self.show_status {
            entry.show_status = Some(show_status.clone());
        }
        if let Some(seconds) = self.watched_seconds {
            entry.watched_seconds = Some(seconds);
        }
        if let Some(duration) = self.total_duration {
            entry.total_duration = Some(duration);
        }
        if let Some(at) = self.last_watched {
            entry.last_watched = Some(at);
        }
    }
}

/// Minimal record of an owning user, upserted on first write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
