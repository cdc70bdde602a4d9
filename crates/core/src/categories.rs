//! Category constants and validation.

use crate::color::validate_color;

/// Color assigned to a category created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

/// Maximum length of a category name.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;

/// Trim a category name and check it is non-empty and within bounds.
///
/// Returns the trimmed name that should be stored.
pub fn normalize_category_name(name: &str) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Category name is required".to_string());
    }
    if trimmed.chars().count() > MAX_CATEGORY_NAME_LENGTH {
        return Err(format!(
            "Category name exceeds maximum length of {MAX_CATEGORY_NAME_LENGTH} characters"
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate the optional fields of a category update.
///
/// Returns the normalized name (if one was supplied).
pub fn validate_category_update(
    name: Option<&str>,
    color: Option<&str>,
) -> Result<Option<String>, String> {
    if let Some(c) = color {
        validate_color(c)?;
    }
    name.map(normalize_category_name).transpose()
}
