//! Field validation for user-supplied input.
//!
//! Values are trimmed before any other check. A field that trims to empty is
//! "absent": an error for the required entry points, `None` for the `_opt`
//! ones. Name-like fields are restricted to Unicode letters/marks/numbers
//! plus a small punctuation allow-list; long-text fields accept arbitrary
//! non-control Unicode (newline, carriage return, and tab included) but never
//! angle brackets.

use std::sync::LazyLock;

use regex::Regex;

/// Letters (L*), marks (M*), numbers (N*), and the allow-listed punctuation.
/// Anything else fails the match, `<`, `>`, and control characters included.
static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}\p{M}\p{N} \-_.,:;'’()\[\]&/]*$").expect("name pattern is valid")
});

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required.")]
    Required { field: String },

    #[error("{field} is too long (max {max} chars).")]
    TooLong { field: String, max: usize },

    #[error(
        "{field} has invalid characters. Allowed: letters/numbers (Unicode), spaces, \
         and common punctuation (- _ ' ’ . , : ; ( ) [ ] & /). \
         Also blocked: < > and control characters."
    )]
    InvalidCharacters { field: String },

    #[error("{field} must be a number.")]
    NotANumber { field: String },

    #[error("{field} must be at least {min}.")]
    TooSmall { field: String, min: i64 },

    #[error("{field} must be at most {max}.")]
    TooLarge { field: String, max: i64 },

    #[error("{field} contains blocked characters: < or >.")]
    BlockedCharacters { field: String },

    #[error("{field} contains invalid control characters.")]
    ControlCharacters { field: String },
}

/// Trim the raw value; an all-whitespace or missing value becomes `None`.
fn trimmed(raw: Option<&str>) -> Option<String> {
    let value = raw.unwrap_or_default().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// C0 controls and DEL. Deliberately narrower than `char::is_control`, which
/// would also reject the C1 range.
fn is_control(ch: char) -> bool {
    let code = ch as u32;
    code < 32 || code == 127
}

fn check_name(value: &str, field: &str, max_len: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max_len {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: max_len,
        });
    }
    if !NAME_RE.is_match(value) {
        return Err(ValidationError::InvalidCharacters {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn check_long_text(value: &str, field: &str, max_len: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max_len {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: max_len,
        });
    }
    for ch in value.chars() {
        if ch == '<' || ch == '>' {
            return Err(ValidationError::BlockedCharacters {
                field: field.to_string(),
            });
        }
        if matches!(ch, '\n' | '\r' | '\t') {
            continue;
        }
        if is_control(ch) {
            return Err(ValidationError::ControlCharacters {
                field: field.to_string(),
            });
        }
    }
    Ok(())
}

/// Validate a required name-like field.
pub fn name(raw: Option<&str>, field: &str, max_len: usize) -> Result<String, ValidationError> {
    match trimmed(raw) {
        Some(value) => {
            check_name(&value, field, max_len)?;
            Ok(value)
        }
        None => Err(ValidationError::Required {
            field: field.to_string(),
        }),
    }
}

/// Validate an optional name-like field. Absent input yields `Ok(None)`.
pub fn name_opt(
    raw: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<Option<String>, ValidationError> {
    match trimmed(raw) {
        Some(value) => {
            check_name(&value, field, max_len)?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Validate a required long-text field.
pub fn long_text(
    raw: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<String, ValidationError> {
    match trimmed(raw) {
        Some(value) => {
            check_long_text(&value, field, max_len)?;
            Ok(value)
        }
        None => Err(ValidationError::Required {
            field: field.to_string(),
        }),
    }
}

/// Validate an optional long-text field. Absent input yields `Ok(None)`.
pub fn long_text_opt(
    raw: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<Option<String>, ValidationError> {
    match trimmed(raw) {
        Some(value) => {
            check_long_text(&value, field, max_len)?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

fn parse_int(
    value: &str,
    field: &str,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<i64, ValidationError> {
    let number: i64 = value.parse().map_err(|_| ValidationError::NotANumber {
        field: field.to_string(),
    })?;
    if let Some(min) = min {
        if number < min {
            return Err(ValidationError::TooSmall {
                field: field.to_string(),
                min,
            });
        }
    }
    if let Some(max) = max {
        if number > max {
            return Err(ValidationError::TooLarge {
                field: field.to_string(),
                max,
            });
        }
    }
    Ok(number)
}

/// Validate a required whole-number field with optional inclusive bounds.
pub fn integer(
    raw: Option<&str>,
    field: &str,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<i64, ValidationError> {
    match trimmed(raw) {
        Some(value) => parse_int(&value, field, min, max),
        None => Err(ValidationError::Required {
            field: field.to_string(),
        }),
    }
}

/// Validate an optional whole-number field. Absent input yields `Ok(None)`.
pub fn integer_opt(
    raw: Option<&str>,
    field: &str,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<Option<i64>, ValidationError> {
    match trimmed(raw) {
        Some(value) => parse_int(&value, field, min, max).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_accepts_plain_text() {
        assert_eq!(name(Some("Tales of Aanur"), "name", 100).unwrap(), "Tales of Aanur");
    }

    #[test]
    fn name_trims_whitespace() {
        assert_eq!(name(Some("  Aanur  "), "name", 100).unwrap(), "Aanur");
    }

    #[test]
    fn name_accepts_unicode_letters() {
        assert!(name(Some("Örnsköldsvik"), "name", 100).is_ok());
        assert!(name(Some("Škoda Østergård"), "name", 100).is_ok());
        assert!(name(Some("北方之城"), "name", 100).is_ok());
    }

    #[test]
    fn name_accepts_combining_marks() {
        // "e" + U+0301 combining acute accent
        assert!(name(Some("Aane\u{301}"), "name", 100).is_ok());
    }

    #[test]
    fn name_accepts_allowed_punctuation() {
        assert!(name(Some("D'Artagnan"), "name", 100).is_ok());
        assert!(name(Some("N’Ghara"), "name", 100).is_ok());
        assert!(name(Some("The Vault (Lower Halls) [West]"), "name", 100).is_ok());
        assert!(name(Some("Smith & Sons / Co."), "name", 100).is_ok());
        assert!(name(Some("a-b_c.d,e:f;g"), "name", 100).is_ok());
    }

    #[test]
    fn name_rejects_angle_brackets() {
        assert!(matches!(
            name(Some("<script>"), "name", 100),
            Err(ValidationError::InvalidCharacters { .. })
        ));
        assert!(name(Some("a > b"), "name", 100).is_err());
    }

    #[test]
    fn name_rejects_emoji_and_symbols() {
        assert!(name(Some("Aanur 🎲"), "name", 100).is_err());
        assert!(name(Some("gold = 50"), "name", 100).is_err());
        assert!(name(Some("50%"), "name", 100).is_err());
    }

    #[test]
    fn name_rejects_control_characters() {
        assert!(name(Some("a\u{0}b"), "name", 100).is_err());
        assert!(name(Some("tab\there"), "name", 100).is_err());
    }

    #[test]
    fn name_required_but_absent() {
        assert!(matches!(
            name(None, "name", 100),
            Err(ValidationError::Required { .. })
        ));
        assert!(name(Some("   "), "name", 100).is_err());
    }

    #[test]
    fn name_opt_absent_is_none() {
        assert_eq!(name_opt(None, "player_name", 100).unwrap(), None);
        assert_eq!(name_opt(Some(""), "player_name", 100).unwrap(), None);
        assert_eq!(name_opt(Some("  "), "player_name", 100).unwrap(), None);
    }

    #[test]
    fn name_too_long() {
        let long = "a".repeat(101);
        assert!(matches!(
            name(Some(&long), "name", 100),
            Err(ValidationError::TooLong { max: 100, .. })
        ));
        let exact = "a".repeat(100);
        assert!(name(Some(&exact), "name", 100).is_ok());
    }

    #[test]
    fn name_length_counts_chars_not_bytes() {
        // Five two-byte characters fit a max of five.
        assert!(name(Some("ööööö"), "name", 5).is_ok());
    }

    #[test]
    fn long_text_permits_newlines_and_tabs() {
        let value = "line one\nline two\r\n\tindented";
        assert_eq!(long_text(Some(value), "content", 50_000).unwrap(), value);
    }

    #[test]
    fn long_text_permits_emoji_and_symbols() {
        assert!(long_text(Some("The party rolled 🎲 = 20!"), "content", 50_000).is_ok());
    }

    #[test]
    fn long_text_rejects_angle_brackets() {
        assert!(matches!(
            long_text(Some("safe <img> unsafe"), "content", 50_000),
            Err(ValidationError::BlockedCharacters { .. })
        ));
    }

    #[test]
    fn long_text_rejects_other_control_characters() {
        assert!(matches!(
            long_text(Some("bad\u{0}byte"), "content", 50_000),
            Err(ValidationError::ControlCharacters { .. })
        ));
        assert!(long_text(Some("del\u{7f}"), "content", 50_000).is_err());
    }

    #[test]
    fn long_text_allows_c1_range() {
        // Only C0 and DEL are blocked; U+0085 (NEL) passes.
        assert!(long_text(Some("a\u{85}b"), "content", 50_000).is_ok());
    }

    #[test]
    fn long_text_opt_absent_is_none() {
        assert_eq!(long_text_opt(None, "notes", 4_000).unwrap(), None);
        assert_eq!(long_text_opt(Some(" \n "), "notes", 4_000).unwrap(), None);
    }

    #[test]
    fn integer_parses_within_bounds() {
        assert_eq!(integer(Some("15"), "level", Some(0), Some(30)).unwrap(), 15);
        assert_eq!(integer(Some("0"), "level", Some(0), Some(30)).unwrap(), 0);
        assert_eq!(integer(Some("30"), "level", Some(0), Some(30)).unwrap(), 30);
    }

    #[test]
    fn integer_rejects_out_of_bounds() {
        assert!(matches!(
            integer(Some("31"), "level", Some(0), Some(30)),
            Err(ValidationError::TooLarge { max: 30, .. })
        ));
        assert!(matches!(
            integer(Some("-1"), "level", Some(0), Some(30)),
            Err(ValidationError::TooSmall { min: 0, .. })
        ));
    }

    #[test]
    fn integer_rejects_non_numeric() {
        assert!(matches!(
            integer(Some("twelve"), "level", None, None),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(integer(Some("1.5"), "level", None, None).is_err());
    }

    #[test]
    fn integer_opt_absent_is_none() {
        assert_eq!(integer_opt(None, "level", Some(0), Some(30)).unwrap(), None);
        assert_eq!(integer_opt(Some(""), "level", Some(0), Some(30)).unwrap(), None);
    }

    #[test]
    fn integer_required_but_absent() {
        assert!(matches!(
            integer(Some("  "), "level", None, None),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = name(None, "player_name", 100).unwrap_err();
        assert_eq!(err.to_string(), "player_name is required.");

        let err = integer(Some("99"), "level", Some(0), Some(30)).unwrap_err();
        assert_eq!(err.to_string(), "level must be at most 30.");

        let long = "x".repeat(101);
        let err = name(Some(&long), "name", 100).unwrap_err();
        assert_eq!(err.to_string(), "name is too long (max 100 chars).");
    }
}
