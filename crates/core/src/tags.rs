//! Tag name normalization and validation.
//!
//! Tag names are case-insensitive: `"Work"`, `"work"` and `"  WORK "` all
//! refer to the same tag, stored as `"work"`.

use crate::color::validate_color;

/// Color assigned to a tag created without one.
pub const DEFAULT_TAG_COLOR: &str = "#10B981";

/// Maximum length of a normalized tag name.
pub const MAX_TAG_NAME_LENGTH: usize = 50;

/// Normalize a tag name: trim surrounding whitespace, lower-case.
pub fn normalize_tag_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalize and validate a tag name, returning the stored form.
pub fn validate_tag_name(name: &str) -> Result<String, String> {
    let normalized = normalize_tag_name(name);
    if normalized.is_empty() {
        return Err("Tag name is required".to_string());
    }
    if normalized.chars().count() > MAX_TAG_NAME_LENGTH {
        return Err(format!(
            "Tag name exceeds maximum length of {MAX_TAG_NAME_LENGTH} characters"
        ));
    }
    Ok(normalized)
}

/// Validate an optional tag color.
pub fn validate_tag_color(color: Option<&str>) -> Result<(), String> {
    color.map(validate_color).transpose().map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_trims_and_lowercases() {
        assert_eq!(normalize_tag_name("  Work "), "work");
        assert_eq!(normalize_tag_name("URGENT"), "urgent");
    }

    #[test]
    fn differently_cased_names_collapse() {
        assert_eq!(
            validate_tag_name("Work").unwrap(),
            validate_tag_name("  work ").unwrap()
        );
    }

    #[test]
    fn whitespace_only_name_rejected() {
        assert_eq!(validate_tag_name(" \t ").unwrap_err(), "Tag name is required");
    }

    #[test]
    fn overlong_name_rejected() {
        let long = "t".repeat(MAX_TAG_NAME_LENGTH + 1);
        assert!(validate_tag_name(&long).is_err());
    }

    #[test]
    fn color_is_optional() {
        assert!(validate_tag_color(None).is_ok());
        assert!(validate_tag_color(Some("#10B981")).is_ok());
        assert!(validate_tag_color(Some("green")).is_err());
    }
}
