use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarkupError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Page {0} not found")]
    MissingPage(u32),

    #[error("Annotation operation failed: {0}")]
    OperationError(String),

    #[error("Invalid image data: {0}")]
    InvalidImage(String),
}
