pub mod sorting;
mod types;
mod validation;

pub use types::{
    EntryPatch, MediaKind, MediaRef, NewEntry, TrackedEntry, UserRecord, WatchStatus,
};
pub use validation::{
    validate_new_entry, validate_patch, ValidationError, MAX_NOTES_CHARS, MAX_RATING,
};
