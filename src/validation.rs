//! Server-side validation rules for the wizard steps
//!
//! Numeric and date fields arrive as free text and are parsed here; the
//! contributor e-mail check rejects addresses at common personal-mail
//! domains so contact details stay institutional.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex_lite::Regex;

use crate::errors::AppError;

/// Personal-mail domains rejected for contributor_email. Only the leading
/// domain label is checked, so `a@mail.gmail.com` is accepted while
/// `a@gmail.com` is not.
const FREEMAIL_DOMAINS: &[&str] = &["gmail", "yahoo", "outlook", "hotmail", "protonmail"];

fn email_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?i)[\w.\-]+@[\w.\-]+\.[a-z]{2,}$").expect("valid e-mail pattern")
    })
}

/// Check whether an address looks like a university or work e-mail.
pub fn is_work_email(email: &str) -> bool {
    if !email_shape().is_match(email) {
        return false;
    }
    let Some(domain) = email.split('@').nth(1) else {
        return false;
    };
    let first_label = domain.split('.').next().unwrap_or(domain).to_ascii_lowercase();
    !FREEMAIL_DOMAINS.contains(&first_label.as_str())
}

/// Validate contributor_email, mirroring the form-level message.
pub fn validate_contributor_email(email: &str) -> Result<(), AppError> {
    if is_work_email(email) {
        Ok(())
    } else {
        Err(AppError::validation(
            "Please use your university or work e-mail address.",
            "contributor_email",
        ))
    }
}

/// Parse the optional date_conducted field. Empty or missing text is fine;
/// non-empty text must be a strict `YYYY-MM-DD` calendar date.
pub fn parse_date_conducted(value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                AppError::validation(
                    "Invalid date format. Please use YYYY-MM-DD.",
                    "date_conducted",
                )
            }),
    }
}

/// dose_value must parse as a real number >= 0
pub fn parse_dose_value(value: &str) -> Result<f64, AppError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| *v >= 0.0)
        .ok_or_else(|| {
            AppError::validation("Dose value must be a non-negative number", "dose_value")
        })
}

/// group_size must parse as an integer > 0
pub fn parse_group_size(value: &str) -> Result<i32, AppError> {
    value
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| {
            AppError::validation("Group size must be a positive integer", "group_size")
        })
}

/// Cancer outcomes record a tumor count: an integer >= 0, validated before
/// storage but stored as text.
pub fn parse_tumor_count(value: &str) -> Result<i64, AppError> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|v| *v >= 0)
        .ok_or_else(|| {
            AppError::validation(
                "Invalid tumor count: must be a non-negative integer",
                "cancer_value",
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_email_accepts_institutional_addresses() {
        assert!(is_work_email("a@state.edu"));
        assert!(is_work_email("jane.doe@epa.gov"));
        assert!(is_work_email("researcher@lab-name.example.org"));
    }

    #[test]
    fn work_email_rejects_freemail_domains() {
        assert!(!is_work_email("a@gmail.com"));
        assert!(!is_work_email("a@GMAIL.com"));
        assert!(!is_work_email("a@yahoo.co.uk"));
        assert!(!is_work_email("a@protonmail.ch"));
    }

    #[test]
    fn work_email_only_checks_the_leading_label() {
        // Matches the original pattern: the denylist applies to the first
        // domain label only.
        assert!(is_work_email("a@mail.gmail.com"));
    }

    #[test]
    fn work_email_rejects_malformed_addresses() {
        assert!(!is_work_email("not-an-email"));
        assert!(!is_work_email("a@nodot"));
        assert!(!is_work_email("@state.edu"));
        assert!(!is_work_email("a@state.e"));
    }

    #[test]
    fn date_conducted_is_optional_but_strict() {
        assert_eq!(parse_date_conducted(None).unwrap(), None);
        assert_eq!(parse_date_conducted(Some("")).unwrap(), None);
        assert_eq!(
            parse_date_conducted(Some("2023-06-15")).unwrap(),
            Some(NaiveDate::from_ymd_opt(2023, 6, 15).unwrap())
        );
        assert!(parse_date_conducted(Some("2023-13-40")).is_err());
        assert!(parse_date_conducted(Some("06/15/2023")).is_err());
    }

    #[test]
    fn dose_value_must_be_non_negative() {
        assert_eq!(parse_dose_value("5.0").unwrap(), 5.0);
        assert_eq!(parse_dose_value("0").unwrap(), 0.0);
        assert!(parse_dose_value("-1").is_err());
        assert!(parse_dose_value("five").is_err());
    }

    #[test]
    fn group_size_must_be_positive() {
        assert_eq!(parse_group_size("10").unwrap(), 10);
        assert!(parse_group_size("0").is_err());
        assert!(parse_group_size("-3").is_err());
        assert!(parse_group_size("2.5").is_err());
    }

    #[test]
    fn tumor_count_must_be_a_non_negative_integer() {
        assert_eq!(parse_tumor_count("3").unwrap(), 3);
        assert_eq!(parse_tumor_count("0").unwrap(), 0);
        assert!(parse_tumor_count("-1").is_err());
        assert!(parse_tumor_count("3.5").is_err());
        assert!(parse_tumor_count("many").is_err());
    }
}
