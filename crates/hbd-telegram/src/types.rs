//! The slice of the Bot API object model the service reads.
//!
//! Unknown fields are ignored, so these stay small.

use hbd_core::user::{ChatId, Identity};
use serde::Deserialize;

use crate::{Error, Result};

/// Every Bot API response is wrapped in this envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
  pub ok:          bool,
  pub result:      Option<T>,
  pub description: Option<String>,
}

impl<T> ApiResponse<T> {
  pub fn into_result(self, method: &'static str) -> Result<T> {
    if !self.ok {
      return Err(Error::Api {
        method,
        description: self.description.unwrap_or_else(|| "no description".into()),
      });
    }
    self.result.ok_or(Error::MissingResult(method))
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
  pub update_id: i64,
  /// Absent for edits, callbacks and the other update kinds.
  #[serde(default)]
  pub message:   Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
  pub message_id: i64,
  /// Empty for messages sent on behalf of a channel.
  #[serde(default)]
  pub from:       Option<Sender>,
  pub chat:       Chat,
  #[serde(default)]
  pub text:       Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sender {
  pub id:       Identity,
  #[serde(default)]
  pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
  pub id: ChatId,
}
