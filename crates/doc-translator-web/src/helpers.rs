//! Helper types and traits for cleaner route handlers.
//!
//! Provides extension traits for converting `Option` and `Result` types
//! into HTTP-appropriate error responses, reducing boilerplate in routes.

use axum::http::StatusCode;
use doc_translator_core::{ApiKey, Error, Lang, PipelineError};

/// Standard result type for route handlers.
pub type RouteResult<T> = Result<T, (StatusCode, String)>;

/// Extension trait for converting `Option<T>` to `RouteResult<T>`.
pub trait OptionExt<T> {
    /// Returns the contained value or a 404 Not Found error.
    fn or_not_found(self, msg: &str) -> RouteResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, msg: &str) -> RouteResult<T> {
        self.ok_or_else(|| (StatusCode::NOT_FOUND, msg.to_string()))
    }
}

/// Extension trait for converting `Result<T, E>` to `RouteResult<T>`.
pub trait ResultExt<T, E: std::fmt::Display> {
    /// Converts the error to 500 Internal Server Error.
    fn or_internal_error(self) -> RouteResult<T>;

    /// Converts the error to 400 Bad Request.
    fn or_bad_request(self) -> RouteResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T, E> for Result<T, E> {
    fn or_internal_error(self) -> RouteResult<T> {
        self.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
    }

    fn or_bad_request(self) -> RouteResult<T> {
        self.map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
    }
}

/// Maps core errors onto the status code the browser sees.
pub trait CoreResultExt<T> {
    fn or_error_response(self) -> RouteResult<T>;
}

impl<T> CoreResultExt<T> for Result<T, Error> {
    fn or_error_response(self) -> RouteResult<T> {
        self.map_err(|e| (error_status(&e), format!("Error: {e}")))
    }
}

impl<T> CoreResultExt<T> for Result<T, PipelineError> {
    fn or_error_response(self) -> RouteResult<T> {
        self.map_err(|e| (error_status(&e.source), e.status_message()))
    }
}

pub const fn error_status(err: &Error) -> StatusCode {
    if err.is_contract_violation() {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    match err {
        Error::MissingCredential
        | Error::EmptyInput
        | Error::UnsupportedFileType(_)
        | Error::Extraction(_)
        | Error::NoContentFound
        | Error::InvalidWordIndex(_) => StatusCode::BAD_REQUEST,
        Error::InputTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        Error::ProviderRequest { .. }
        | Error::ProviderInvalidResponse(_)
        | Error::SynonymRequest(_)
        | Error::EmptyTranslationResult => StatusCode::BAD_GATEWAY,
        Error::ProviderTimeout => StatusCode::GATEWAY_TIMEOUT,
        Error::Cancelled => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Key from the request body, or the server's key when the field is blank.
pub fn credential_or(key: Option<String>, fallback: Option<ApiKey>) -> Option<ApiKey> {
    key.and_then(ApiKey::new).or(fallback)
}

/// Language code from a form field, or `default` when absent or blank.
pub fn lang_or(code: Option<String>, default: &Lang) -> Lang {
    match code {
        Some(code) if !code.trim().is_empty() => Lang::new(code.trim()),
        _ => default.clone(),
    }
}
