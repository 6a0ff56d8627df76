//! Container and object name validation.
//!
//! Container names follow bucket conventions:
//! - 3 to 63 characters
//! - Only lowercase ASCII letters, digits, `-`, `_` and `.`
//! - Must start and end with a letter or digit
//!
//! Object names are more permissive:
//! - Must be non-empty and at most 1024 bytes
//! - Must not contain NUL, `\`, carriage return or line feed
//! - `/`-separated components must be non-empty and not `.` or `..`

use crate::error::TypeError;

const MAX_OBJECT_NAME_LEN: usize = 1024;

/// Validate a container name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use funk_types::validate_container_name;
///
/// assert!(validate_container_name("config-backups").is_ok());
/// assert!(validate_container_name("Bad_Bucket").is_err());
/// assert!(validate_container_name("ab").is_err());
/// ```
pub fn validate_container_name(name: &str) -> Result<(), TypeError> {
    let invalid = |reason: &str| TypeError::InvalidContainerName {
        name: name.to_string(),
        reason: reason.into(),
    };

    if name.len() < 3 || name.len() > 63 {
        return Err(invalid("must be between 3 and 63 characters"));
    }
    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.')))
    {
        return Err(invalid(&format!("contains forbidden character: {ch:?}")));
    }
    let alnum = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
    if !alnum(name.chars().next()) || !alnum(name.chars().last()) {
        return Err(invalid("must start and end with a letter or digit"));
    }
    Ok(())
}

/// Validate an object name, returning `Ok(())` if valid.
pub fn validate_object_name(name: &str) -> Result<(), TypeError> {
    let invalid = |reason: &str| TypeError::InvalidObjectName {
        name: name.to_string(),
        reason: reason.into(),
    };

    if name.is_empty() {
        return Err(invalid("object name must not be empty"));
    }
    if name.len() > MAX_OBJECT_NAME_LEN {
        return Err(invalid("longer than 1024 bytes"));
    }
    if let Some(ch) = name.chars().find(|c| matches!(c, '\0' | '\\' | '\r' | '\n')) {
        return Err(invalid(&format!("contains forbidden character: {ch:?}")));
    }
    for component in name.split('/') {
        match component {
            "" => return Err(invalid("path components must not be empty")),
            "." | ".." => return Err(invalid("must not contain '.' or '..' components")),
            _ => {}
        }
    }
    Ok(())
}
