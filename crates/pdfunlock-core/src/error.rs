use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnlockError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("PDF has no pages")]
    NoPages,

    #[error("PDF operation failed: {0}")]
    OperationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}
