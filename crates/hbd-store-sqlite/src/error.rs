//! Error type for `hbd-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("user not found: {0}")]
  UserNotFound(String),

  #[error("subscription not found: {subscriber} -> {subscribe_to}")]
  SubscriptionNotFound {
    subscriber:   hbd_core::user::Identity,
    subscribe_to: hbd_core::user::Identity,
  },

  /// A UNIQUE or PRIMARY KEY constraint rejected the write.
  #[error("{0} already exists")]
  AlreadyExists(String),
}

impl From<Error> for hbd_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::UserNotFound(_) | Error::SubscriptionNotFound { .. } => {
        hbd_core::Error::NotFound(e.to_string())
      }
      Error::AlreadyExists(what) => hbd_core::Error::AlreadyExists(what),
      other => hbd_core::Error::storage(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
