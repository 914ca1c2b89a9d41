use thiserror::Error;

/// Errors surfaced while reading, parsing or emitting a schema.
#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed schema document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("the target formatter rejected the generated source: {0}")]
    Format(String),
}
