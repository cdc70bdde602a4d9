//! Hex color validation shared by categories and tags.

use std::sync::LazyLock;

use regex::Regex;

/// Accepted color format: `#RRGGBB`.
const HEX_COLOR_PATTERN: &str = r"^#[0-9A-Fa-f]{6}$";

static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(HEX_COLOR_PATTERN).expect("valid regex"));

/// Validate a `#RRGGBB` color string.
pub fn validate_color(color: &str) -> Result<(), String> {
    if HEX_COLOR_RE.is_match(color) {
        Ok(())
    } else {
        Err(format!(
            "Invalid color '{color}'. Expected a hex color like #3B82F6"
        ))
    }
}

/// Resolve an optional color: validate it when present, else use `default`.
pub fn color_or_default(color: Option<&str>, default: &str) -> Result<String, String> {
    match color.map(str::trim) {
        Some(c) if !c.is_empty() => {
            validate_color(c)?;
            Ok(c.to_string())
        }
        _ => Ok(default.to_string()),
    }
}
