use thiserror::Error;

pub type FieldResult<T> = Result<T, FieldError>;

// Raised by a request view when a field cannot be read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("field {0:?} is not available")]
    Unavailable(String),

    #[error("field {field:?} is malformed: {reason}")]
    Malformed { field: String, reason: String },
}

impl FieldError {
    pub fn unavailable(field: &str) -> Self {
        FieldError::Unavailable(field.to_string())
    }

    pub fn malformed(field: &str, reason: impl Into<String>) -> Self {
        FieldError::Malformed {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum TraceError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("panicked while tracing request: {0}")]
    Panicked(String),
}
