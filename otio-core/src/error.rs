//! Error types for timeline operations

/// Errors that can occur while building, querying or serializing a timeline
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum OtioError {
    /// Lookup found nothing
    #[error("Not found")]
    NotFound,

    /// A clip has no media reference to resolve its range from
    #[error("Missing media reference")]
    MissingReference,

    /// A media reference key is not present in a clip's mapping
    #[error("Media reference not found: {0}")]
    MediaReferenceNotFound(String),

    /// Neither an explicit source range nor a fallback is available
    #[error("Cannot compute available range")]
    CannotComputeAvailableRange,

    /// Timecode or time string conversion failed
    #[error("Invalid timecode: {0}")]
    InvalidTimecode(String),

    /// The composable already belongs to a composition
    #[error("Child already has a parent")]
    ChildAlreadyHasParent,

    /// The composable is not a child of the receiving composition
    #[error("Item is not a child of this composition")]
    NotAChild,

    /// The two nodes live in different trees
    #[error("Items have no common ancestor")]
    NoCommonAncestor,

    /// Appending would make a composition contain itself
    #[error("Appending would create a cycle")]
    WouldCreateCycle,

    /// Index outside the valid range
    #[error("Index {index} out of bounds (size {size})")]
    IndexOutOfBounds {
        /// The offending index.
        index: i64,
        /// The length of the sequence.
        size: usize,
    },

    /// An object of the wrong kind was supplied
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// The kind that was required.
        expected: String,
        /// The kind that was found.
        got: String,
    },

    /// Misuse of the schema registry
    #[error("Schema error ({schema}): {message}")]
    SchemaError {
        /// The schema string involved.
        schema: String,
        /// What went wrong.
        message: String,
    },

    /// Malformed JSON or a field of the wrong JSON type
    #[error("JSON error: {0}")]
    JsonError(String),

    /// IO error during read/write
    #[error("IO error: {0}")]
    Io(String),
}

impl OtioError {
    pub(crate) fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        OtioError::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub(crate) fn schema(schema: impl Into<String>, message: impl Into<String>) -> Self {
        OtioError::SchemaError {
            schema: schema.into(),
            message: message.into(),
        }
    }

    pub(crate) fn json(message: impl Into<String>) -> Self {
        OtioError::JsonError(message.into())
    }
}

impl From<std::io::Error> for OtioError {
    fn from(err: std::io::Error) -> Self {
        OtioError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for OtioError {
    fn from(err: serde_json::Error) -> Self {
        OtioError::JsonError(err.to_string())
    }
}

impl From<opentime::TimecodeError> for OtioError {
    fn from(err: opentime::TimecodeError) -> Self {
        OtioError::InvalidTimecode(err.to_string())
    }
}
