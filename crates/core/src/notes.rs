//! Note defaults and validation.

/// Title given to a note created without one (or with a blank one).
pub const DEFAULT_NOTE_TITLE: &str = "Untitled Note";

/// Maximum length of a note title in characters.
pub const MAX_NOTE_TITLE_LENGTH: usize = 255;

/// Maximum size of note content in bytes. Content is otherwise opaque.
pub const MAX_NOTE_CONTENT_BYTES: usize = 1_048_576;

/// Resolve the title for a new note.
pub fn title_or_default(title: Option<&str>) -> Result<String, String> {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => {
            validate_note_title(t)?;
            Ok(t.to_string())
        }
        _ => Ok(DEFAULT_NOTE_TITLE.to_string()),
    }
}

/// Validate a note title supplied on update. Blank titles are rejected here
/// rather than silently replaced.
pub fn validate_note_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Note title cannot be blank".to_string());
    }
    if title.chars().count() > MAX_NOTE_TITLE_LENGTH {
        return Err(format!(
            "Note title exceeds maximum length of {MAX_NOTE_TITLE_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate note content size.
pub fn validate_note_content(content: &str) -> Result<(), String> {
    if content.len() > MAX_NOTE_CONTENT_BYTES {
        return Err(format!(
            "Note content exceeds maximum size of {MAX_NOTE_CONTENT_BYTES} bytes"
        ));
    }
    Ok(())
}
