//! The messaging gateway: whatever chat transport carries invites, kicks and
//! status messages.

use std::future::Future;

use crate::user::{ChatId, Identity};

pub trait MessagingGateway: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Best-effort delivery. Failures are logged by the implementation and
  /// never reported to the caller.
  fn send_message<'a>(
    &'a self,
    chat: ChatId,
    text: &'a str,
  ) -> impl Future<Output = ()> + Send + 'a;

  /// A shareable link that lets people join `space`. `context` names the
  /// occasion and may be used to label the link.
  fn invite_link<'a>(
    &'a self,
    space: ChatId,
    context: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// Lift any ban on `member` so the invite link works for them.
  fn admit_member(
    &self,
    space: ChatId,
    member: Identity,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove `member` from `space`.
  fn remove_member(
    &self,
    space: ChatId,
    member: Identity,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
