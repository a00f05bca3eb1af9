use chrono::NaiveDateTime;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use validator::ValidationError;

use crate::store::models::DATE_FORMAT;
use crate::store::ApplicationStatus;

/// `http(s)://`, optional `www.`, a host label, a dot, then any non-whitespace.
/// Anchored on both ends so a partially valid link fails.
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\Ahttps?://(?:www\.)?[a-zA-Z0-9]+\.\S{2,}\z").expect("URL pattern is valid")
});

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

pub fn is_valid_url(link: &str) -> bool {
    URL_REGEX.is_match(link)
}

/// Text must contain something other than whitespace
pub fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", "This field is required"));
    }
    Ok(())
}

/// Required link with full URL shape, used for new entries
pub fn required_link(link: &str) -> Result<(), ValidationError> {
    required(link)?;
    link_shape(link)
}

/// Optional link: empty is accepted, anything else must be a full URL
pub fn link_shape(link: &str) -> Result<(), ValidationError> {
    let link = link.trim();
    if link.is_empty() || is_valid_url(link) {
        return Ok(());
    }
    Err(error(
        "url",
        "Invalid URL format. Enter a full link starting with http:// or https://",
    ))
}

pub fn known_status(status: &str) -> Result<(), ValidationError> {
    status
        .parse::<ApplicationStatus>()
        .map(|_| ())
        .map_err(|_| {
            error(
                "status",
                "Status must be one of: Submitted, Interviewing, Rejected, Not Submitted",
            )
        })
}

/// Submission dates carried in from another file must use the tracker's `YYYY-MM-DD HH:MM` stamp
pub fn submission_date(date: &str) -> Result<NaiveDateTime, ValidationError> {
    NaiveDateTime::parse_from_str(date.trim(), DATE_FORMAT).map_err(|_| {
        error(
            "date",
            "Date_Submitted must be formatted as YYYY-MM-DD HH:MM",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_full_links() {
        assert!(is_valid_url("https://example.com/job/123"));
        assert!(is_valid_url("http://acme.com/jobs/1"));
        assert!(is_valid_url("https://www.linkedin.com/jobs/view/42"));
        assert!(is_valid_url("https://careers.example.org"));
    }

    #[test]
    fn rejects_other_schemes_and_bare_hosts() {
        assert!(!is_valid_url("ftp://x.com/a"));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("https://localhost"));
        assert!(!is_valid_url("https://"));
    }

    #[test]
    fn requires_full_string_match() {
        assert!(!is_valid_url("see https://example.com/job"));
        assert!(!is_valid_url("https://example.com/job 123"));
        assert!(!is_valid_url(" https://example.com/job"));
    }

    #[test]
    fn required_trims_whitespace() {
        assert!(required("Engineer").is_ok());
        assert_eq!(required("   ").unwrap_err().code, "required");
        assert!(required("").is_err());
    }

    #[test]
    fn required_link_reports_missing_before_shape() {
        assert_eq!(required_link("").unwrap_err().code, "required");
        assert_eq!(required_link("example.com").unwrap_err().code, "url");
        assert!(required_link("https://acme.com/jobs/1").is_ok());
    }

    #[test]
    fn link_shape_allows_empty() {
        assert!(link_shape("").is_ok());
        assert!(link_shape("ftp://x.com/a").is_err());
    }

    #[test]
    fn status_must_be_known_label() {
        assert!(known_status("Not Submitted").is_ok());
        assert!(known_status("Interviewing").is_ok());
        assert_eq!(known_status("Ghosted").unwrap_err().code, "status");
    }

    #[test]
    fn submission_date_requires_tracker_format() {
        assert!(submission_date("2023-11-02 14:05").is_ok());
        assert!(submission_date(" 2023-11-02 14:05 ").is_ok());
        assert!(submission_date("last tuesday").is_err());
        assert!(submission_date("2023-11-02").is_err());
        assert_eq!(submission_date("02/11/2023 14:05").unwrap_err().code, "date");
    }
}
