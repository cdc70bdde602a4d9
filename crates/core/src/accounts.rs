//! Account field normalization and validation.
//!
//! Emails are stored trimmed and lower-cased so that login and the
//! `uq_users_email` constraint are case-insensitive in practice.

use validator::ValidateEmail;

/// Maximum length of an email address (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length of a user's display name.
pub const MAX_FULL_NAME_LENGTH: usize = 100;

/// Default minimum password length, overridable via `PASSWORD_MIN_LENGTH`.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// Trim and lower-case an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate an already-normalized email address.
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(format!(
            "Email exceeds maximum length of {MAX_EMAIL_LENGTH} characters"
        ));
    }
    if !email.validate_email() {
        return Err(format!("'{email}' is not a valid email address"));
    }
    Ok(())
}

/// Trim an optional display name; blank names become `None`.
pub fn normalize_full_name(name: Option<&str>) -> Result<Option<String>, String> {
    let Some(trimmed) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > MAX_FULL_NAME_LENGTH {
        return Err(format!(
            "Full name exceeds maximum length of {MAX_FULL_NAME_LENGTH} characters"
        ));
    }
    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn validate_email_accepts_plain_address() {
        assert!(validate_email("alice@example.com").is_ok());
    }

    #[test]
    fn validate_email_rejects_missing_at() {
        let err = validate_email("alice.example.com").unwrap_err();
        assert!(err.contains("not a valid email"));
    }

    #[test]
    fn validate_email_rejects_empty() {
        assert_eq!(validate_email("").unwrap_err(), "Email is required");
    }

    #[test]
    fn blank_full_name_becomes_none() {
        assert_eq!(normalize_full_name(Some("   ")).unwrap(), None);
        assert_eq!(normalize_full_name(None).unwrap(), None);
    }

    #[test]
    fn full_name_is_trimmed() {
        assert_eq!(
            normalize_full_name(Some("  Ada Lovelace ")).unwrap(),
            Some("Ada Lovelace".to_string())
        );
    }

    #[test]
    fn overlong_full_name_rejected() {
        let long = "x".repeat(MAX_FULL_NAME_LENGTH + 1);
        assert!(normalize_full_name(Some(&long)).is_err());
    }
}
