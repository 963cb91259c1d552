use std::string::FromUtf8Error;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarcFillError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Please provide either a file or text input")]
    NoInput,

    #[error("Unsupported file type: {0} (expected one of: {1})")]
    UnsupportedFileType(String, String),

    #[error("Input is {size} bytes, larger than the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Input is not valid UTF-8 text: {0}")]
    Decode(#[from] FromUtf8Error),

    #[error("Invalid repair profile: {0}")]
    InvalidProfile(String),

    #[error("MarcFillError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for MarcFillError {
    fn from(error: std::io::Error) -> Self {
        MarcFillError::Io(Box::new(error))
    }
}
