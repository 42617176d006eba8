use thiserror::Error;

/// Fatal errors raised while computing message layouts.
///
/// Every variant carries enough naming to point at the schema construct
/// that caused it; nothing here is recoverable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("unsupported field type: {path}")]
    UnsupportedField { path: String },

    #[error("unknown message type '{name}' referenced by {path}")]
    UnknownMessage { name: String, path: String },

    #[error("circular message nesting detected: {0:?}")]
    CircularNesting(Vec<String>),

    #[error("message '{message}' has size {size}, not a multiple of word size {word}")]
    MisalignedSize { message: String, size: u64, word: u64 },

    #[error("field '{path}' at offset {offset} with size {size} exceeds message size {message_size}")]
    FieldOutOfBounds {
        path: String,
        offset: u64,
        size: u64,
        message_size: u64,
    },
}
