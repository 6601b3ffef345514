//! Payload validation for tracked entry mutations.
//!
//! Validation failures are terminal: they are never retried and surface to
//! the caller on the first attempt.

use thiserror::Error;

use super::types::{EntryPatch, NewEntry};

/// Highest accepted rating.
pub const MAX_RATING: u8 = 10;

/// Longest accepted free-text notes, in characters.
pub const MAX_NOTES_CHARS: usize = 2000;

/// Errors produced by payload validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("rating {0} is out of range (0..={MAX_RATING})")]
    RatingOutOfRange(u8),
    #[error("notes exceed {MAX_NOTES_CHARS} characters ({0})")]
    NotesTooLong(usize),
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("invalid media id: {0}")]
    InvalidMediaId(i64),
}

/// Result type for validation.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Validates a create payload.
pub fn validate_new_entry(new: &NewEntry) -> Result<()> {
    if new.media.id <= 0 {
        return Err(ValidationError::InvalidMediaId(new.media.id));
    }
    if new.media.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

/// Validates an update payload.
pub fn validate_patch(patch: &EntryPatch) -> Result<()> {
    if let Some(rating) = patch.rating {
        if rating > MAX_RATING {
            return Err(ValidationError::RatingOutOfRange(rating));
        }
    }
    if let Some(ref notes) = patch.notes {
        let len = notes.chars().count();
        if len > MAX_NOTES_CHARS {
            return Err(ValidationError::NotesTooLong(len));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaKind, MediaRef, WatchStatus};

    #[test]
    fn test_valid_new_entry() {
        let new = NewEntry::new(
            MediaRef::new(42, MediaKind::Movie, "Heat"),
            WatchStatus::PlanToWatch,
        );
        assert!(validate_new_entry(&new).is_ok());
    }

    #[test]
    fn test_new_entry_rejects_bad_media_id() {
        let new = NewEntry::new(
            MediaRef::new(0, MediaKind::Movie, "Heat"),
            WatchStatus::PlanToWatch,
        );
        assert_eq!(
            validate_new_entry(&new),
            Err(ValidationError::InvalidMediaId(0))
        );
    }

    #[test]
    fn test_new_entry_rejects_blank_title() {
        let new = NewEntry::new(
            MediaRef::new(42, MediaKind::Movie, "   "),
            WatchStatus::PlanToWatch,
        );
        assert_eq!(validate_new_entry(&new), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn test_patch_rejects_rating_out_of_range() {
        let patch = EntryPatch::default().with_rating(11);
        assert_eq!(
            validate_patch(&patch),
            Err(ValidationError::RatingOutOfRange(11))
        );
    }

    #[test]
    fn test_patch_accepts_max_rating() {
        let patch = EntryPatch::default().with_rating(MAX_RATING);
        assert!(validate_patch(&patch).is_ok());
    }

    #[test]
    fn test_patch_rejects_oversized_notes() {
        let patch = EntryPatch::default().with_notes("x".repeat(MAX_NOTES_CHARS + 1));
        assert_eq!(
            validate_patch(&patch),
            Err(ValidationError::NotesTooLong(MAX_NOTES_CHARS + 1))
        );
    }

    #[test]
    fn test_empty_patch_is_valid() {
        assert!(validate_patch(&EntryPatch::default()).is_ok());
    }
}
