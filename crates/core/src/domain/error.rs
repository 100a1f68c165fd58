use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid path: {0}. parent segments are not allowed")]
    InvalidPath(String),

    #[error("invalid name: {0:?}. a name must be a single, non-empty path segment")]
    InvalidName(String),
}
