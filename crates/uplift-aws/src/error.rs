//! Error type for `uplift-aws`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("sns request failed: {0}")]
  Sns(String),

  #[error("dynamodb request failed: {0}")]
  Dynamo(String),

  #[error("response missing {0}")]
  MissingField(&'static str),

  /// A stored item that cannot be decoded into a domain type.
  #[error("malformed item: {0}")]
  Decode(String),
}

impl Error {
  pub(crate) fn sns(e: impl std::fmt::Display) -> Self {
    Error::Sns(e.to_string())
  }

  pub(crate) fn dynamo(e: impl std::fmt::Display) -> Self {
    Error::Dynamo(e.to_string())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
