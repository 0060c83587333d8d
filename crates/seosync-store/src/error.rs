//! Error types for metadata store operations.

/// Errors raised while reading, parsing, or rewriting the metadata store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The `<binding> = {` declaration could not be located.
    #[error("anchor not found: no object literal bound to `{binding}`")]
    AnchorNotFound { binding: String },

    /// The store's object literal has no matching closing brace.
    #[error("unterminated object literal for `{binding}` opened at byte {open}")]
    Unterminated { binding: String, open: usize },

    /// A token sequence the parser cannot interpret.
    #[error("syntax error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// The same key is written twice in the store.
    #[error("duplicate key `{key}` at byte {offset}")]
    DuplicateKey { key: String, offset: usize },

    /// Storage or I/O failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// File content is not valid UTF-8 text.
    #[error("corrupted store: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            offset,
            message: message.into(),
        }
    }
}
