use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubtitleError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("validation error: {0}")]
    ValidationError(String),
    #[error("login access token expired, please re-download cookies")]
    AuthExpired,
    #[error("missing cookie: {0}")]
    MissingCookie(String),
    #[error("no episodes found for content {0}")]
    EmptySeason(String),
    #[error("other: {0}")]
    Other(String),
}
