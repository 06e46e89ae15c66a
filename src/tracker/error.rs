use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("field '{0}' is not a number")]
    NotNumeric(&'static str),
    #[error("field '{0}' must be non-negative")]
    Negative(&'static str),
}
