//! Detection errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Document has no body element")]
    MissingBody,

    #[error("HTML serialization failed: {0}")]
    Serialize(#[from] std::io::Error),

    #[error("Serialized HTML is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
