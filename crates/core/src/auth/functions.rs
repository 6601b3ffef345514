//! Pure helpers for the authorization boundary.

use super::{AuthError, Result};

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// A missing header or an empty token yields `MissingCredential`; any other
/// scheme yields `MalformedHeader`.
pub fn bearer_token(header: Option<&str>) -> Result<&str> {
    let header = header.ok_or(AuthError::MissingCredential)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedHeader)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_token() {
        assert_eq!(bearer_token(Some("Bearer abc123")), Ok("abc123"));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(bearer_token(None), Err(AuthError::MissingCredential));
    }

    #[test]
    fn test_empty_token() {
        assert_eq!(
            bearer_token(Some("Bearer   ")),
            Err(AuthError::MissingCredential)
        );
    }

    #[test]
    fn test_wrong_scheme() {
        assert_eq!(
            bearer_token(Some("Basic dXNlcjpwYXNz")),
            Err(AuthError::MalformedHeader)
        );
    }
}
