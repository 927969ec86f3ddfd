//! Field-level validation for records, images, and accounts.
//!
//! Each helper returns the normalized value (trimmed, blank optionals turned
//! into `None`) or a [`CoreError::Validation`] naming the offending field.

use url::Url;
use validator::ValidateEmail;

use crate::error::CoreError;

pub const TITLE_MAX_LEN: usize = 255;
pub const ARTIST_MAX_LEN: usize = 255;
pub const GENRE_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 5000;
pub const IMAGE_URL_MAX_LEN: usize = 2048;
pub const PUBLIC_ID_MAX_LEN: usize = 255;
pub const ALT_TEXT_MAX_LEN: usize = 500;
pub const EMAIL_MAX_LEN: usize = 254;

/// Earliest release year accepted for a record.
pub const MIN_RELEASE_YEAR: i32 = 1900;

/// Minimum password length for self-registered accounts.
pub const MIN_PASSWORD_LEN: usize = 6;

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

/// Trim `value` and require it to be non-empty and at most `max_len` chars.
pub fn required_text(field: &str, value: &str, max_len: usize) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    check_len(field, trimmed, max_len)?;
    Ok(trimmed.to_string())
}

/// Trim an optional value; blank strings become `None`.
pub fn optional_text(
    field: &str,
    value: Option<&str>,
    max_len: usize,
) -> Result<Option<String>, CoreError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => {
            check_len(field, trimmed, max_len)?;
            Ok(Some(trimmed.to_string()))
        }
    }
}

fn check_len(field: &str, value: &str, max_len: usize) -> Result<(), CoreError> {
    let len = value.chars().count();
    if len > max_len {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max_len} characters (got {len})"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Release year must fall between [`MIN_RELEASE_YEAR`] and `current_year`.
pub fn validate_year(year: i32, current_year: i32) -> Result<(), CoreError> {
    if !(MIN_RELEASE_YEAR..=current_year).contains(&year) {
        return Err(CoreError::Validation(format!(
            "year must be between {MIN_RELEASE_YEAR} and {current_year}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// CDN delivery URLs must parse as absolute `http(s)` URLs with a host.
pub fn image_url(value: &str) -> Result<String, CoreError> {
    let url = required_text("image_url", value, IMAGE_URL_MAX_LEN)?;
    let invalid = || CoreError::Validation("image_url must be an absolute http(s) URL".into());

    // `Url::parse` percent-encodes inner whitespace instead of rejecting it.
    if url.contains(char::is_whitespace) {
        return Err(invalid());
    }
    let parsed = Url::parse(&url).map_err(|_| invalid())?;
    let has_host = parsed.host_str().is_some_and(|host| !host.is_empty());
    if !matches!(parsed.scheme(), "http" | "https") || !has_host {
        return Err(invalid());
    }
    Ok(url)
}

/// The CDN identifier used later to destroy the blob.
pub fn public_id(value: &str) -> Result<String, CoreError> {
    required_text("image_public_id", value, PUBLIC_ID_MAX_LEN)
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Email address check (RFC 5322 via `validator`), lowercased. The domain
/// must also contain a dot, so bare intranet hosts are rejected.
pub fn email(value: &str) -> Result<String, CoreError> {
    let email = required_text("email", value, EMAIL_MAX_LEN)?.to_lowercase();
    let dotted_domain = email
        .rsplit_once('@')
        .is_some_and(|(_, domain)| domain.contains('.') && !domain.ends_with('.'));
    if !email.validate_email() || !dotted_domain {
        return Err(CoreError::Validation("Invalid email address".into()));
    }
    Ok(email)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
