//! Field validation for everything that crosses a write boundary.
//!
//! All checks run before any storage call; the first failing field is
//! reported with the document-layout field name the caller sent.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::{CourseFields, UserId, ValidationError};

pub const MAX_NAME_LEN: usize = 128;
pub const MAX_DESCRIPTION_LEN: usize = 4096;
pub const MAX_MEETING_TIME_LEN: usize = 128;
pub const MAX_COMMENT_LEN: usize = 2048;
pub const MAX_ID_LEN: usize = 64;

lazy_static! {
    // e.g. "CS-546": 2-3 letters, dash, 3 digits
    static ref COURSE_CODE: Regex = Regex::new(r"^[A-Za-z]{2,3}-[0-9]{3}$").unwrap();
    // two-token "First Last", allowing O'Brien / Smith-Jones / St. John
    static ref PROFESSOR: Regex =
        Regex::new(r"^[A-Za-z][A-Za-z'.-]* [A-Za-z][A-Za-z'.-]*$").unwrap();
}

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

fn non_empty(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max),
        ));
    }
    Ok(trimmed.to_string())
}

/// Normalizes a course code to uppercase after checking its shape.
pub fn course_code(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if !COURSE_CODE.is_match(trimmed) {
        return Err(ValidationError::new(
            "courseCode",
            "must be 2-3 letters, a dash and 3 digits, like CS-546",
        ));
    }
    Ok(trimmed.to_uppercase())
}

pub fn course_name(value: &str) -> Result<String, ValidationError> {
    non_empty("courseName", value, MAX_NAME_LEN)
}

pub fn course_description(value: &str) -> Result<String, ValidationError> {
    non_empty("courseDescription", value, MAX_DESCRIPTION_LEN)
}

pub fn meeting_time(value: &str) -> Result<String, ValidationError> {
    non_empty("meetingTime", value, MAX_MEETING_TIME_LEN)
}

pub fn professor(value: &str) -> Result<String, ValidationError> {
    let trimmed = non_empty("professor", value, MAX_NAME_LEN)?;
    if !PROFESSOR.is_match(&trimmed) {
        return Err(ValidationError::new(
            "professor",
            "must be a two-token name, like Jane Doe",
        ));
    }
    Ok(trimmed)
}

/// Checks the link is an absolute http(s) URL whose path names an image.
/// Reachability is probed separately, after format validation passes.
pub fn img_link(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("imgLink", "must not be empty"));
    }
    let parsed =
        Url::parse(trimmed).map_err(|err| ValidationError::new("imgLink", err.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::new(
            "imgLink",
            "must be an http or https URL",
        ));
    }
    let path = parsed.path().to_ascii_lowercase();
    if !IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return Err(ValidationError::new(
            "imgLink",
            "must end in an image extension like .jpg or .png",
        ));
    }
    Ok(trimmed.to_string())
}

pub fn user_id(field: &'static str, value: &str) -> Result<UserId, ValidationError> {
    Ok(UserId::new(non_empty(field, value, MAX_ID_LEN)?))
}

pub fn comment_text(value: &str) -> Result<String, ValidationError> {
    non_empty("text", value, MAX_COMMENT_LEN)
}

pub fn rating(value: Option<u8>) -> Result<Option<u8>, ValidationError> {
    match value {
        None => Ok(None),
        Some(r @ 1..=5) => Ok(Some(r)),
        Some(other) => Err(ValidationError::new(
            "rating",
            format!("must be an integer between 1 and 5, got {}", other),
        )),
    }
}

/// Validates and normalizes the whole scalar field set, reporting the first
/// offending field.
pub fn course_fields(fields: CourseFields) -> Result<CourseFields, ValidationError> {
    Ok(CourseFields {
        admin_id: user_id("adminId", fields.admin_id.as_str())?,
        course_code: course_code(&fields.course_code)?,
        course_name: course_name(&fields.course_name)?,
        course_description: course_description(&fields.course_description)?,
        meeting_time: meeting_time(&fields.meeting_time)?,
        img_link: img_link(&fields.img_link)?,
        professor: professor(&fields.professor)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_code_accepts_seed_shapes() {
        assert_eq!(course_code("CS-546").unwrap(), "CS-546");
        assert_eq!(course_code("ee-101").unwrap(), "EE-101");
        assert_eq!(course_code(" BIO-220 ").unwrap(), "BIO-220");
    }

    #[test]
    fn course_code_rejects_other_shapes() {
        for bad in ["CS546", "C-546", "CSCI-546", "CS-54", "CS-5467", "CS 546", ""] {
            let err = course_code(bad).unwrap_err();
            assert_eq!(err.field, "courseCode");
        }
    }

    #[test]
    fn professor_requires_two_tokens() {
        assert!(professor("Jane Doe").is_ok());
        assert!(professor("Patrick O'Brien").is_ok());
        assert!(professor("Mary Smith-Jones").is_ok());
        assert!(professor("Plato").is_err());
        assert!(professor("Jane Q Doe").is_err());
        assert!(professor("42 Doe").is_err());
    }

    #[test]
    fn img_link_requires_http_image_url() {
        assert!(img_link("https://example.com/img/cs546.jpg").is_ok());
        assert!(img_link("http://example.com/a.PNG").is_ok());
        assert!(img_link("https://example.com/pic.webp?w=800").is_ok());
        assert!(img_link("ftp://example.com/a.jpg").is_err());
        assert!(img_link("https://example.com/page.html").is_err());
        assert!(img_link("not a url").is_err());
    }

    #[test]
    fn rating_bounds() {
        assert_eq!(rating(None).unwrap(), None);
        assert_eq!(rating(Some(1)).unwrap(), Some(1));
        assert_eq!(rating(Some(5)).unwrap(), Some(5));
        assert!(rating(Some(0)).is_err());
        assert!(rating(Some(6)).is_err());
    }

    #[test]
    fn comment_text_trims_and_rejects_blank() {
        assert_eq!(comment_text("  great course  ").unwrap(), "great course");
        assert!(comment_text("   ").is_err());
    }
}
