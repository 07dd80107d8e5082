//! Common validation utilities.

use validator::{ValidateEmail, ValidationError};

/// Maximum length of a name search term.
pub const MAX_SEARCH_TERM_LENGTH: usize = 100;

/// Default upper bound for free-text answers (dietary notes, messages).
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 1000;

/// Minimum number of digits for a phone number to be plausible.
const MIN_PHONE_DIGITS: usize = 7;

lazy_static::lazy_static! {
    static ref PHONE_REGEX: regex::Regex =
        regex::Regex::new(r"^\+?[0-9 ().\-]{7,25}$").unwrap();
    static ref WHITESPACE_REGEX: regex::Regex = regex::Regex::new(r"\s+").unwrap();
}

/// Validates that an email address is present and well formed.
pub fn validate_email_address(email: &str) -> Result<(), ValidationError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("email_required");
        err.message = Some("Please enter your email address".into());
        return Err(err);
    }
    if trimmed.to_string().validate_email() {
        Ok(())
    } else {
        let mut err = ValidationError::new("email_format");
        err.message = Some("Please enter a valid email address".into());
        Err(err)
    }
}

/// Validates an optional phone number. Empty input is accepted.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    let digits = trimmed.chars().filter(|c| c.is_ascii_digit()).count();
    if PHONE_REGEX.is_match(trimmed) && digits >= MIN_PHONE_DIGITS {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_format");
        err.message = Some("Please enter a valid phone number".into());
        Err(err)
    }
}

/// Validates that free text does not exceed `max_chars` characters.
pub fn validate_free_text(text: &str, max_chars: usize) -> Result<(), ValidationError> {
    if text.chars().count() <= max_chars {
        Ok(())
    } else {
        let mut err = ValidationError::new("text_length");
        err.message = Some(format!("Please keep this under {} characters", max_chars).into());
        Err(err)
    }
}

/// Trims a name search term and collapses inner whitespace.
///
/// Returns `None` when nothing but whitespace was entered.
pub fn normalize_search_term(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(WHITESPACE_REGEX.replace_all(trimmed, " ").into_owned())
}

/// Validates a raw search term: non-blank and within the length limit.
pub fn validate_search_term(raw: &str) -> Result<(), ValidationError> {
    match normalize_search_term(raw) {
        None => {
            let mut err = ValidationError::new("search_term_required");
            err.message = Some("Please enter at least a first or last name".into());
            Err(err)
        }
        Some(term) if term.chars().count() > MAX_SEARCH_TERM_LENGTH => {
            let mut err = ValidationError::new("search_term_length");
            err.message = Some(
                format!(
                    "Search term must be at most {} characters",
                    MAX_SEARCH_TERM_LENGTH
                )
                .into(),
            );
            Err(err)
        }
        Some(_) => Ok(()),
    }
}

/// Converts optional free text into `None` when blank.
pub fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
