//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Maximum slug length accepted from owners.
pub const MAX_SLUG_LENGTH: usize = 80;

/// Minimum digits a phone number must carry.
const MIN_PHONE_DIGITS: usize = 8;

/// Maximum digits in an E.164 number.
const MAX_PHONE_DIGITS: usize = 15;

lazy_static! {
    /// Lowercase alphanumeric runs joined by single hyphens.
    static ref SLUG_RE: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
    static ref PHONE_CHARS_RE: Regex = Regex::new(r"^\+?[0-9 ().\-]+$").unwrap();
}

/// Validates a public site slug.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.len() > MAX_SLUG_LENGTH {
        let mut err = ValidationError::new("slug_length");
        err.message = Some(format!("Slug must be at most {} characters", MAX_SLUG_LENGTH).into());
        return Err(err);
    }
    if !SLUG_RE.is_match(slug) {
        let mut err = ValidationError::new("slug_format");
        err.message =
            Some("Slug may only contain lowercase letters, digits and single hyphens".into());
        return Err(err);
    }
    Ok(())
}

/// Returns only the ASCII digits of a phone number.
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validates a free-form phone number such as `(11) 99999-9999`.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("phone_required");
        err.message = Some("Phone is required".into());
        return Err(err);
    }
    let digits = phone_digits(trimmed).len();
    if !PHONE_CHARS_RE.is_match(trimmed) || !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
    {
        let mut err = ValidationError::new("phone_format");
        err.message = Some("Phone must contain between 8 and 15 digits".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a field that must contain something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Schemes a page would execute or inline instead of fetching.
const SCRIPT_SCHEMES: &[&str] = &["javascript", "vbscript", "data"];

/// Validates a stored media reference.
///
/// Object storage URLs are kept verbatim, so any `scheme:` URL or
/// root-relative path (`/media/...`) passes. Protocol-relative URLs and
/// script-capable schemes do not. The empty string means "unset".
pub fn validate_media_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() {
        return Ok(());
    }
    let valid = if url.starts_with('/') {
        !url.starts_with("//")
    } else {
        match url.split_once(':') {
            Some((scheme, rest)) => {
                is_scheme(scheme)
                    && !rest.is_empty()
                    && !SCRIPT_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str())
            }
            None => false,
        }
    };
    if valid && !url.contains(char::is_whitespace) {
        Ok(())
    } else {
        let mut err = ValidationError::new("media_url");
        err.message = Some("Must be a media URL or a /media path".into());
        Err(err)
    }
}

fn is_scheme(value: &str) -> bool {
    let mut chars = value.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Validates an absolute `http(s)` URL. The empty string means "unset".
pub fn validate_http_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() {
        return Ok(());
    }
    let valid = ["http://", "https://"].iter().any(|scheme| {
        url.strip_prefix(scheme)
            .map(|rest| !rest.is_empty() && !rest.starts_with('/') && !rest.contains(char::is_whitespace))
            .unwrap_or(false)
    });
    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("url_format");
        err.message = Some("Must be an http or https URL".into());
        Err(err)
    }
}
