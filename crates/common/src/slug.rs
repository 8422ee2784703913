//! Invitation slug validation

use regex::Regex;
use std::sync::LazyLock;

use crate::{Error, Result};

/// Maximum slug length
pub const MAX_SLUG_LENGTH: usize = 64;

/// Lowercase alphanumerics with hyphens, no leading/trailing hyphen
static SLUG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").expect("slug regex is valid")
});

/// Validate an invitation slug
pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() {
        return Err(Error::Validation("Invitation slug is required".to_string()));
    }
    if slug.len() > MAX_SLUG_LENGTH {
        return Err(Error::Validation(format!(
            "Invitation slug must be ≤{} characters",
            MAX_SLUG_LENGTH
        )));
    }
    if !SLUG_REGEX.is_match(slug) || slug.contains("--") {
        return Err(Error::Validation(format!("Invalid invitation slug: {slug}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_rules() {
        // Valid slugs
        assert!(validate_slug("a").is_ok());
        assert!(validate_slug("kim-and-lee").is_ok());
        assert!(validate_slug("wedding2026").is_ok());

        // Invalid slugs
        assert!(validate_slug("").is_err());
        assert!(validate_slug("-kim").is_err());
        assert!(validate_slug("kim-").is_err());
        assert!(validate_slug("Kim").is_err());
        assert!(validate_slug("kim_lee").is_err());
        assert!(validate_slug("kim--lee").is_err());
        assert!(validate_slug(&"a".repeat(MAX_SLUG_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_missing_slug_is_validation_error() {
        let err = validate_slug("").unwrap_err();
        assert!(err.is_validation());
    }
}
