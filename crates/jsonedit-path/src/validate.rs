//! Pointer syntax and size checks.

use crate::PathError;

/// Maximum allowed pointer string length, in bytes.
pub const MAX_POINTER_LENGTH: usize = 4096;

/// Validate a JSON Pointer string.
///
/// # Errors
///
/// Returns an error if:
/// - The pointer is non-empty but doesn't start with `/`
/// - The pointer exceeds [`MAX_POINTER_LENGTH`]
///
/// # Example
///
/// ```
/// use jsonedit_path::validate_json_pointer;
///
/// validate_json_pointer("").unwrap();
/// validate_json_pointer("/foo/bar").unwrap();
/// validate_json_pointer("foo").unwrap_err();
/// ```
pub fn validate_json_pointer(pointer: &str) -> Result<(), PathError> {
    if pointer.is_empty() {
        return Ok(());
    }
    if !pointer.starts_with('/') {
        return Err(PathError::InvalidPointer(pointer.to_string()));
    }
    if pointer.len() > MAX_POINTER_LENGTH {
        return Err(PathError::PointerTooLong(pointer.len()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_relative_pointer() {
        assert!(validate_json_pointer("foo").is_err());
        assert!(validate_json_pointer("foo/bar").is_err());
    }

    #[test]
    fn test_validate_long_pointer() {
        let long_pointer = "/".to_string() + &"a".repeat(MAX_POINTER_LENGTH);
        assert_eq!(
            validate_json_pointer(&long_pointer),
            Err(PathError::PointerTooLong(MAX_POINTER_LENGTH + 1))
        );
    }
}
