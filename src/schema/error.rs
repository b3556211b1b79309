use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Duplicate field name '{0}'")]
    DuplicateFieldName(String),

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Field index {index} out of range for {count} fields")]
    FieldOutOfRange { index: usize, count: usize },

    #[error("Expected {expected} values, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("Field '{field}' expects {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: &'static str,
    },

    #[error("Unknown comparator '{0}'")]
    UnknownComparator(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
