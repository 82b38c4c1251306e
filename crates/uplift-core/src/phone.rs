//! Phone number validation.
//!
//! Numbers are stored and transmitted in E.164-ish form: a leading `+`
//! followed by the country code and digits. Validation happens at the
//! boundary (HTTP body, CLI flag) so everything past it can assume a
//! well-formed number.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A validated subscriber phone number (`+<country code><digits>`).
///
/// Serialises as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
  /// Validate and wrap a raw phone number string.
  pub fn new(raw: impl Into<String>) -> Result<Self> {
    let raw = raw.into();
    let Some(digits) = raw.strip_prefix('+') else {
      return Err(Error::InvalidPhone(raw));
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
      return Err(Error::InvalidPhone(raw));
    }
    Ok(Self(raw))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for PhoneNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl TryFrom<String> for PhoneNumber {
  type Error = Error;

  fn try_from(raw: String) -> Result<Self> {
    Self::new(raw)
  }
}
