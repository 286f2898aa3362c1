//! Validation helpers for DTOs.

use validator::ValidationError;

/// Maximum accepted length for catalog ids and user ids.
const MAX_ID_LENGTH: usize = 64;

/// Validates that a catalog or user id is non-empty, bounded and alphanumeric.
///
/// # Examples
///
/// ```ignore
/// validate_opaque_id("4Z8W4fKeB5YxbusRsdQVPb") // Ok
/// validate_opaque_id("")                       // Err - empty
/// validate_opaque_id("abc def")                // Err - whitespace
/// ```
pub fn validate_opaque_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > MAX_ID_LENGTH {
        let mut err = ValidationError::new("id_length");
        err.message = Some(
            format!("id must be between 1 and {MAX_ID_LENGTH} characters (got {})", id.len())
                .into(),
        );
        return Err(err);
    }

    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        let mut err = ValidationError::new("id_format");
        err.message =
            Some("id must contain only alphanumeric characters, hyphens or underscores".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_opaque_id_valid() {
        assert!(validate_opaque_id("4Z8W4fKeB5YxbusRsdQVPb").is_ok());
        assert!(validate_opaque_id("user-42").is_ok());
        assert!(validate_opaque_id("a").is_ok());
    }

    #[test]
    fn test_validate_opaque_id_invalid_length() {
        assert!(validate_opaque_id("").is_err());
        assert!(validate_opaque_id(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_opaque_id_invalid_format() {
        assert!(validate_opaque_id("abc def").is_err());
        assert!(validate_opaque_id("id/with/slashes").is_err());
        assert!(validate_opaque_id("id\u{e9}").is_err());
    }
}
