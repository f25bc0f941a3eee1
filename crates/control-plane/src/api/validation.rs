// Input validation for the public API
//
// Last-resort limits on names and payload sizes. These are hard limits,
// not configurable; the username limit matches its column width.

use crate::services::ServiceError;

// =============================================================================
// Input Size Limits
// =============================================================================

/// Maximum length of a username in characters (VARCHAR(100)).
pub const MAX_USERNAME_CHARS: usize = 100;

/// Maximum size of an environment or variable name.
pub const MAX_NAME_BYTES: usize = 255;

/// Maximum size of a description field.
/// 10 KB allows detailed descriptions.
pub const MAX_DESCRIPTION_BYTES: usize = 10 * 1024; // 10 KB

/// Maximum size of a variable value.
/// 1 MB is enough for certificates and embedded config files.
pub const MAX_VALUE_BYTES: usize = 1024 * 1024; // 1 MB

// =============================================================================
// Validation Functions
// =============================================================================

pub fn validate_username(username: &str) -> Result<(), ServiceError> {
    if username.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "username must not be empty".to_string(),
        ));
    }
    if username.chars().count() > MAX_USERNAME_CHARS {
        return Err(ServiceError::InvalidInput(format!(
            "username must be at most {} characters",
            MAX_USERNAME_CHARS
        )));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.is_empty() {
        return Err(ServiceError::InvalidInput(
            "password must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Environment and variable names appear as URL path segments
pub fn validate_name(field: &str, name: &str) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::InvalidInput(format!(
            "{} must not be empty",
            field
        )));
    }
    if name.contains('/') {
        return Err(ServiceError::InvalidInput(format!(
            "{} must not contain '/'",
            field
        )));
    }
    if name.len() > MAX_NAME_BYTES {
        tracing::warn!(
            "{} exceeds limit: {} bytes (max: {})",
            field,
            name.len(),
            MAX_NAME_BYTES
        );
        return Err(ServiceError::InvalidInput(format!(
            "{} must be at most {} bytes",
            field, MAX_NAME_BYTES
        )));
    }
    Ok(())
}

pub fn validate_description(description: Option<&str>) -> Result<(), ServiceError> {
    match description {
        Some(d) if d.len() > MAX_DESCRIPTION_BYTES => {
            tracing::warn!(
                "Description exceeds limit: {} bytes (max: {})",
                d.len(),
                MAX_DESCRIPTION_BYTES
            );
            Err(ServiceError::InvalidInput(format!(
                "description must be at most {} bytes",
                MAX_DESCRIPTION_BYTES
            )))
        }
        _ => Ok(()),
    }
}

pub fn validate_value(value: &str) -> Result<(), ServiceError> {
    if value.len() > MAX_VALUE_BYTES {
        tracing::warn!(
            "Variable value exceeds limit: {} bytes (max: {})",
            value.len(),
            MAX_VALUE_BYTES
        );
        return Err(ServiceError::InvalidInput(format!(
            "value must be at most {} bytes",
            MAX_VALUE_BYTES
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_limits() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("   ").is_err());
        assert!(validate_username(&"a".repeat(MAX_USERNAME_CHARS)).is_ok());
        assert!(validate_username(&"a".repeat(MAX_USERNAME_CHARS + 1)).is_err());
        // Counted in characters, not bytes
        assert!(validate_username(&"é".repeat(MAX_USERNAME_CHARS)).is_ok());
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("name", "prod").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "a/b").is_err());
        assert!(validate_name("name", &"x".repeat(MAX_NAME_BYTES)).is_ok());
        assert!(validate_name("name", &"x".repeat(MAX_NAME_BYTES + 1)).is_err());
    }

    #[test]
    fn test_description_limit() {
        assert!(validate_description(None).is_ok());
        assert!(validate_description(Some("")).is_ok());
        let at_limit = "a".repeat(MAX_DESCRIPTION_BYTES);
        assert!(validate_description(Some(&at_limit)).is_ok());
        let over = "a".repeat(MAX_DESCRIPTION_BYTES + 1);
        assert!(validate_description(Some(&over)).is_err());
    }

    #[test]
    fn test_value_limit() {
        assert!(validate_value("").is_ok());
        assert!(validate_value(&"v".repeat(MAX_VALUE_BYTES)).is_ok());
        assert!(validate_value(&"v".repeat(MAX_VALUE_BYTES + 1)).is_err());
    }

    #[test]
    fn test_error_message_names_field() {
        let err = validate_name("variable name", "").unwrap_err();
        assert_eq!(err.to_string(), "variable name must not be empty");
    }
}
