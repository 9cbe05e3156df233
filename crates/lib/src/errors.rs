use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the tagging library.
#[derive(Error, Debug)]
pub enum TagError {
    #[error("Invalid confidence policy: {0}")]
    InvalidPolicy(String),
    #[error("Malformed vision result: {0}")]
    MalformedResult(String),
    #[error("Metadata container refused to write '{}'", .0.display())]
    WriteRejected(PathBuf),
    #[error("Invalid resize width {width}: must be less than {max}")]
    InvalidResizeWidth { width: u32, max: u32 },
    #[error("Tagger is missing a {0}")]
    MissingComponent(&'static str),
    #[error("API key is missing")]
    MissingApiKey,
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to vision API: {0}")]
    VisionRequest(reqwest::Error),
    #[error("Failed to deserialize vision API response: {0}")]
    VisionDeserialization(reqwest::Error),
    #[error("Vision API returned {status}: {body}")]
    VisionApi { status: u16, body: String },
    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Metadata container error: {0}")]
    Metadata(String),
    #[error("Blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
