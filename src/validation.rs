//! Field validation helpers
//!
//! Synchronous, in-memory checks that run before anything reaches storage.
//! Failures are plain values; the async pipeline surfaces them as rejected
//! outcomes instead of panics.

use core::fmt;

use chrono::NaiveDate;
use chrono::NaiveDateTime;

/// Upper bound for client-supplied identifiers
pub const MAX_IDENTIFIER: i64 = 1_000_000;

/// A single violated field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    /// Path of the field in the payload
    pub path: String,

    /// Human readable message
    pub message: String,
}

/// Aggregated validation failure
///
/// Carries one detail per violated field, so a caller can fix a whole payload
/// in one round trip
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationError {
    details: Vec<FieldError>,
}

impl ValidationError {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a failure for a single field
    pub fn single<P, M>(path: P, message: M) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        let mut error = Self::new();
        error.push(path, message);
        error
    }

    /// Add a violated field
    pub fn push<P, M>(&mut self, path: P, message: M)
    where
        P: Into<String>,
        M: Into<String>,
    {
        self.details.push(FieldError {
            path: path.into(),
            message: message.into(),
        });
    }

    /// Absorb the details of another failure
    pub fn absorb(&mut self, other: ValidationError) {
        self.details.extend(other.details);
    }

    /// All violated fields
    pub fn details(&self) -> &[FieldError] {
        &self.details
    }

    /// Turn the collector into an outcome
    ///
    /// # Errors
    ///
    /// Will return `Err` with itself when any field was violated
    pub fn into_result(self) -> Result<(), Self> {
        if self.details.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.details.is_empty() {
            return write!(f, "A validation error occurred");
        }

        let messages = self
            .details
            .iter()
            .map(|detail| detail.message.as_str())
            .collect::<Vec<&str>>()
            .join("; ");

        write!(f, "{messages}")
    }
}

impl std::error::Error for ValidationError {}

/// Validate a single identifier: positive integer within range
///
/// # Errors
///
/// Will return `Err` when the value is not in `1..=MAX_IDENTIFIER`
pub fn validate_id(field: &str, value: i64) -> Result<i64, ValidationError> {
    if (1..=MAX_IDENTIFIER).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::single(
            field,
            format!("\"{field}\" must be a positive integer no greater than {MAX_IDENTIFIER}"),
        ))
    }
}

/// Validate a batch of identifiers, collecting every offender
///
/// # Errors
///
/// Will return `Err` when any value is not a positive integer within range
pub fn validate_ids(values: &[(&str, i64)]) -> Result<(), ValidationError> {
    let mut errors = ValidationError::new();

    for (field, value) in values {
        if let Err(error) = validate_id(field, *value) {
            errors.absorb(error);
        }
    }

    errors.into_result()
}

/// Validate membership of an allowed set
///
/// # Errors
///
/// Will return `Err` when the value is missing or not in the allowed set
pub fn validate_enum(
    field: &str,
    value: Option<&str>,
    allowed: &[&str],
) -> Result<String, ValidationError> {
    if let Some(value) = value {
        if allowed.contains(&value) {
            return Ok(value.to_string());
        }
    }

    Err(ValidationError::single(
        field,
        format!("\"{field}\" must be one of [{}]", allowed.join(", ")),
    ))
}

/// Validate a calendar date
///
/// A full datetime is tolerated; its time-of-day is ignored
///
/// # Errors
///
/// Will return `Err` when the value is missing or not parseable as a date
pub fn validate_date(field: &str, value: Option<&str>) -> Result<NaiveDate, ValidationError> {
    let Some(value) = value else {
        return Err(ValidationError::single(
            field,
            format!("\"{field}\" is required"),
        ));
    };

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(value).map(|datetime| datetime.date()))
        .ok_or_else(|| {
            ValidationError::single(field, format!("\"{field}\" must be a valid calendar date"))
        })
}

/// Validate a calendar month (1-12)
///
/// # Errors
///
/// Will return `Err` when the value is missing or out of range
pub fn validate_month(field: &str, value: Option<i64>) -> Result<u32, ValidationError> {
    match value {
        Some(month @ 1..=12) => Ok(u32::try_from(month).expect("month fits in u32")),
        _ => Err(ValidationError::single(
            field,
            format!("\"{field}\" must be an integer between 1 and 12"),
        )),
    }
}

/// Validate a plausible 4-digit year
///
/// # Errors
///
/// Will return `Err` when the value is missing or not a 4-digit year
pub fn validate_year(field: &str, value: Option<i64>) -> Result<i32, ValidationError> {
    match value {
        Some(year @ 1000..=9999) => Ok(i32::try_from(year).expect("year fits in i32")),
        _ => Err(ValidationError::single(
            field,
            format!("\"{field}\" must be a 4 digit year"),
        )),
    }
}

/// Parse a datetime in the store's accepted grammar
///
/// Accepts `2024-03-01 10:00:00` and the `T`-separated variant
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}
