use http::StatusCode;

/// Errors reported by the hosted backend
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// Parse an error response of the row or object storage API
    ///
    /// Row errors look like `{"code", "message", "details", "hint"}`, storage
    /// errors like `{"statusCode", "error", "message"}`. Bodies that are not
    /// JSON are kept verbatim.
    pub fn parse(status: StatusCode, body: &[u8]) -> Error {
        let data: Option<serde_json::Value> = serde_json::from_slice(body).ok();
        let field = |name: &str| -> Option<String> {
            data.as_ref()
                .and_then(|d| d.get(name))
                .and_then(|v| v.as_str())
                .map(String::from)
        };
        let message = field("message")
            .or_else(|| field("error"))
            .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());
        match field("code").as_deref() {
            // insufficient_privilege, usually a row-level security refusal
            Some("42501") => return Error::PermissionDenied,
            // unique_violation
            Some("23505") => return Error::Conflict(message),
            // .single() on zero rows
            Some("PGRST116") => return Error::NotFound,
            _ => (),
        }
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::PermissionDenied,
            StatusCode::NOT_FOUND => Error::NotFound,
            StatusCode::CONFLICT => Error::Conflict(message),
            StatusCode::BAD_REQUEST => Error::InvalidRequest(message),
            _ => Error::Unknown(message),
        }
    }
}
