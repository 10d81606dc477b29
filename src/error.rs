//! Error types for the SBH check pipeline.
//!
//! Library code returns [`SbhError`] so the checker can map each failure onto
//! the application status; the binary wraps everything in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

pub type SbhResult<T> = Result<T, SbhError>;

#[derive(Debug, Error)]
pub enum SbhError {
    #[error("No file selected. Pass a flight log with --file")]
    NoFile,

    #[error("Please upload a CSV file ({} has media type {media_type})", .path.display())]
    WrongFileType { path: PathBuf, media_type: String },

    #[error("Flight log contains no data rows")]
    EmptyLog,

    #[error("Flight log row has no {field} value")]
    MissingField { field: &'static str },

    #[error("Line {line} has {found} fields but the header defines {expected}")]
    ShortRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("No API key configured. Set SBH_API_KEY or lookup.api_key")]
    MissingApiKey,

    #[error("Schedule lookup returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Schedule lookup exceeded {max_pages} pages")]
    PageLimit { max_pages: usize },

    #[error("Schedule lookup handed out continuation token {token} twice")]
    RepeatedToken { token: String },

    #[error("Invalid lookup URL: {0}")]
    Url(String),

    #[error("Schedule lookup request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode schedule page: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to read flight log: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SbhError {
    /// Errors raised before any work starts on the selected file.
    pub fn is_selection_error(&self) -> bool {
        matches!(self, SbhError::NoFile | SbhError::WrongFileType { .. })
    }
}
