//! Validation helpers for DTOs.

use validator::{ValidateUrl, ValidationError};

use crate::dto::item::ReleaseYearInput;

/// Error recorded when a required field is absent.
pub fn required_error() -> ValidationError {
    let mut err = ValidationError::new("required");
    err.message = Some("field is required".into());
    err
}

/// Validates that a required text field is present and not blank, returning it trimmed.
pub fn validate_required_text(value: Option<&str>) -> Result<String, ValidationError> {
    let Some(value) = value else {
        return Err(required_error());
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be empty".into());
        return Err(err);
    }

    Ok(trimmed.to_owned())
}

/// Validates that a release year is an integer.
///
/// HTML forms submit every value as text, so numeric strings are accepted as well.
///
/// # Examples
///
/// ```ignore
/// validate_release_year(&ReleaseYearInput::Integer(2020)) // Ok(2020)
/// validate_release_year(&ReleaseYearInput::Text(" 2013 ".into())) // Ok(2013)
/// validate_release_year(&ReleaseYearInput::Float(2020.5)) // Err - not an integer
/// ```
pub fn validate_release_year(value: &ReleaseYearInput) -> Result<i32, ValidationError> {
    let parsed = match value {
        ReleaseYearInput::Integer(year) => i32::try_from(*year).ok(),
        ReleaseYearInput::Float(year) if year.fract() == 0.0 => {
            let year = *year;
            (year >= f64::from(i32::MIN) && year <= f64::from(i32::MAX)).then_some(year as i32)
        }
        ReleaseYearInput::Float(_) => None,
        ReleaseYearInput::Text(text) => text.trim().parse::<i32>().ok(),
    };

    parsed.ok_or_else(|| {
        let mut err = ValidationError::new("release_year_format");
        err.message = Some(format!("must be an integer year (got {value})").into());
        err
    })
}

/// Validates that every character name is non-blank, returning the trimmed names in order.
pub fn validate_characters(values: &[String]) -> Result<Vec<String>, ValidationError> {
    values
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                let mut err = ValidationError::new("blank_character");
                err.message = Some(format!("character #{} must not be empty", index + 1).into());
                Err(err)
            } else {
                Ok(trimmed.to_owned())
            }
        })
        .collect()
}

/// Drops blank optional text so it is stored as absent.
pub fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

/// Validates that an optional URL, when present and not blank, is a well-formed URL.
pub fn validate_optional_url(value: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(url) = normalize_optional_text(value) else {
        return Ok(None);
    };

    if url.validate_url() {
        Ok(Some(url))
    } else {
        let mut err = ValidationError::new("url");
        err.message = Some(format!("`{url}` is not a valid URL").into());
        Err(err)
    }
}
