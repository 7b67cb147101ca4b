//! Telegram client error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The Bot API answered with `"ok": false`.
  #[error("{method} failed: {description}")]
  Api {
    method:      &'static str,
    description: String,
  },

  #[error("{0} returned ok without a result")]
  MissingResult(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for hbd_core::Error {
  fn from(e: Error) -> Self { hbd_core::Error::transport(e) }
}
