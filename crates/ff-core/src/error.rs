use eyre::Error as EyreError;
use std::result;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A request that the type checker should have rejected, e.g. an
    /// `exponent` call whose argument is not real. These abort the fold.
    #[error("internal semantic error: {0}")]
    Internal(String),
    #[error("Generic error: {0}")]
    Generic(EyreError),
}

pub type Result<T> = result::Result<T, Error>;

impl Error {
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }
}

impl From<EyreError> for Error {
    fn from(err: EyreError) -> Self {
        Error::Generic(err)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(EyreError::msg(s))
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Generic(EyreError::msg(s.to_string()))
    }
}
