//! API response types
//!
//! Successful responses wrap their value in a `data` envelope; failures are
//! serialized as a message plus zero or more detail entries.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

/// Successful response with an optional value
pub struct Success<V: Serialize> {
    status_code: StatusCode,
    value: Option<V>,
}

impl<V: Serialize> Success<V> {
    /// 200 response with a value
    pub fn ok(value: V) -> Self {
        Self {
            status_code: StatusCode::OK,
            value: Some(value),
        }
    }

    /// 201 response with a value
    pub fn created(value: V) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            value: Some(value),
        }
    }

    /// 204 response without a value
    pub fn no_content() -> Self {
        Self {
            status_code: StatusCode::NO_CONTENT,
            value: None,
        }
    }
}

#[derive(Serialize)]
struct DataWrapper<V: Serialize> {
    data: V,
}

impl<V: Serialize> IntoResponse for Success<V> {
    fn into_response(self) -> Response {
        match self.value {
            Some(data) => (self.status_code, Json(DataWrapper { data })).into_response(),
            None => self.status_code.into_response(),
        }
    }
}

/// Failed response with a message and detail entries
#[derive(Debug)]
pub struct Error {
    status_code: StatusCode,
    message: String,
    details: Vec<Detail>,
}

/// A single failure detail, optionally tied to a field path
#[derive(Debug, Serialize)]
pub struct Detail {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

impl Detail {
    pub(crate) fn new(message: impl Into<String>, path: Option<String>) -> Self {
        Self {
            message: message.into(),
            path,
        }
    }
}

impl Error {
    pub fn bad_request(message: impl Into<String>, details: Vec<Detail>) -> Self {
        Self {
            status_code: StatusCode::BAD_REQUEST,
            message: message.into(),
            details,
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::FORBIDDEN,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::NOT_FOUND,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            details: Vec::new(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'e> {
    message: &'e str,
    details: &'e [Detail],
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: &self.message,
            details: &self.details,
        };

        (self.status_code, Json(&body)).into_response()
    }
}

impl From<crate::error::Error> for Error {
    fn from(err: crate::error::Error) -> Self {
        use crate::error::Error as DomainError;

        match err {
            DomainError::Validation(validation) => {
                let details = validation
                    .details()
                    .iter()
                    .map(|field| Detail::new(&field.message, Some(field.path.clone())))
                    .collect();

                Self::bad_request("Validation failed", details)
            }
            DomainError::NotFound(message) => Self::not_found(message),
            DomainError::Persistence { .. } | DomainError::UpstreamLookup { .. } => {
                tracing::error!("Internal error: {err:?}");

                Self::internal_server_error(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::validation::ValidationError;

    #[test]
    fn validation_error_maps_to_bad_request_with_paths() {
        let validation = ValidationError::single("description", "\"description\" is required");
        let error = Error::from(crate::error::Error::Validation(validation));

        assert_eq!(StatusCode::BAD_REQUEST, error.status_code);
        assert_eq!(1, error.details.len());
        assert_eq!(Some("description".to_string()), error.details[0].path);
    }

    #[test]
    fn not_found_maps_to_404_without_details() {
        let error = Error::from(crate::error::Error::not_found("Reminder not found"));

        assert_eq!(StatusCode::NOT_FOUND, error.status_code);
        assert_eq!("Reminder not found", error.message);
        assert!(error.details.is_empty());
    }
}
