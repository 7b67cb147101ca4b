//! Error taxonomy shared by every crate in the workspace.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("already exists: {0}")]
  AlreadyExists(String),

  #[error("cannot subscribe to yourself")]
  SelfSubscription,

  /// A messaging gateway call failed.
  #[error("transport failure: {0}")]
  Transport(#[source] BoxError),

  /// A storage call failed for a reason other than a missing or duplicate
  /// row.
  #[error("storage failure: {0}")]
  Storage(#[source] BoxError),

  #[error("invalid configuration: {0}")]
  InvalidConfig(String),
}

impl Error {
  pub fn storage(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Storage(Box::new(e))
  }

  pub fn transport(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Transport(Box::new(e))
  }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound(_)) }

  pub fn is_already_exists(&self) -> bool {
    matches!(self, Self::AlreadyExists(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
