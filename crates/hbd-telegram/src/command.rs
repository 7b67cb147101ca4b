//! Parsing chat commands out of message text.

use hbd_core::user::Identity;
use thiserror::Error;

/// Who a subscription command points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
  /// `@alice`, stored without the `@`.
  Handle(String),
  Identity(Identity),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  Help,
  SubscribeTo(Target),
  UnsubscribeFrom(Target),
  SetNotifications(bool),
  Users,
  Unknown(String),
}

/// A recognised command with bad arguments. The message is the reply sent
/// back to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
  #[error("username must be @username or 0000(telegram_id)")]
  MissingTarget,

  #[error("username must be @username")]
  BadHandle,

  #[error("couldn't get user ID or @username")]
  BadTarget,

  #[error("arg must be 'true' or 'false'")]
  BadFlag,
}

/// Parse `text` as a command. `None` if it is not a command at all.
///
/// The command name may carry a `@botname` suffix, as Telegram appends in
/// group chats; it is dropped.
pub fn parse(text: &str) -> Option<Result<Command, ParseError>> {
  let rest = text.trim().strip_prefix('/')?;
  let (name, args) = match rest.split_once(char::is_whitespace) {
    Some((name, args)) => (name, args.trim()),
    None => (rest, ""),
  };
  let name = name.split_once('@').map_or(name, |(name, _)| name);
  if name.is_empty() {
    return None;
  }

  let command = match name {
    "help" | "start" => Ok(Command::Help),
    "subscribeTo" => parse_target(args).map(Command::SubscribeTo),
    "unSubscribeFrom" => parse_target(args).map(Command::UnsubscribeFrom),
    "subscribeToNotifications" => parse_flag(args).map(Command::SetNotifications),
    "users" => Ok(Command::Users),
    other => Ok(Command::Unknown(other.to_owned())),
  };
  Some(command)
}

fn parse_target(args: &str) -> Result<Target, ParseError> {
  if args.is_empty() {
    return Err(ParseError::MissingTarget);
  }
  if args.contains('@') {
    return match args.strip_prefix('@') {
      Some(handle) if !handle.is_empty() && !handle.contains(['@', ' ']) => {
        Ok(Target::Handle(handle.to_owned()))
      }
      _ => Err(ParseError::BadHandle),
    };
  }
  args
    .parse::<i64>()
    .map(|id| Target::Identity(Identity(id)))
    .map_err(|_| ParseError::BadTarget)
}

fn parse_flag(args: &str) -> Result<bool, ParseError> {
  match args {
    "true" => Ok(true),
    "false" => Ok(false),
    _ => Err(ParseError::BadFlag),
  }
}
