//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::state::game::{HINT_DELIMITER, MAX_HINTS};

const MAX_USER_NAME_LENGTH: usize = 64;

/// Validates that a user name is non-blank, trimmed and reasonably short.
///
/// # Examples
///
/// ```ignore
/// validate_user_name("alice")   // Ok
/// validate_user_name("  ")      // Err - blank
/// validate_user_name(" alice")  // Err - surrounding whitespace
/// ```
pub fn validate_user_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("user_name_blank");
        err.message = Some("User name must not be blank".into());
        return Err(err);
    }

    if name.trim() != name {
        let mut err = ValidationError::new("user_name_whitespace");
        err.message = Some("User name must not start or end with whitespace".into());
        return Err(err);
    }

    let length = name.chars().count();
    if length > MAX_USER_NAME_LENGTH {
        let mut err = ValidationError::new("user_name_length");
        err.message = Some(
            format!("User name must be at most {MAX_USER_NAME_LENGTH} characters (got {length})")
                .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates catalog hints: at most five, none blank, none containing the storage delimiter.
pub fn validate_hints(hints: &[String]) -> Result<(), ValidationError> {
    if hints.len() > usize::from(MAX_HINTS) {
        let mut err = ValidationError::new("hints_count");
        err.message =
            Some(format!("At most {MAX_HINTS} hints are allowed (got {})", hints.len()).into());
        return Err(err);
    }

    if hints.iter().any(|hint| hint.trim().is_empty()) {
        let mut err = ValidationError::new("hints_blank");
        err.message = Some("Hints must not be blank".into());
        return Err(err);
    }

    if hints.iter().any(|hint| hint.contains(HINT_DELIMITER)) {
        let mut err = ValidationError::new("hints_delimiter");
        err.message = Some(format!("Hints must not contain `{HINT_DELIMITER}`").into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_validate_user_name_valid() {
        assert!(validate_user_name("alice").is_ok());
        assert!(validate_user_name("Mary Jane").is_ok());
        assert!(validate_user_name(&"x".repeat(64)).is_ok());
    }

    #[test]
    fn test_validate_user_name_invalid() {
        assert!(validate_user_name("").is_err());
        assert!(validate_user_name("   ").is_err());
        assert!(validate_user_name(" alice").is_err());
        assert!(validate_user_name(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_hints() {
        assert!(validate_hints(&[]).is_ok());
        assert!(validate_hints(&hints(&["1999", "Film", "Male", "Movie", "K.R."])).is_ok());
        assert!(validate_hints(&hints(&["a", "b", "c", "d", "e", "f"])).is_err());
        assert!(validate_hints(&hints(&["1999", " "])).is_err());
        assert!(validate_hints(&hints(&["19^^99"])).is_err());
    }
}
