//! Users and the identifiers used to address them.
//!
//! A user is known internally by a UUID, to other users by a mutable handle,
//! and to the messaging transport by an immutable [`Identity`].

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Addresses ───────────────────────────────────────────────────────────────

/// The stable external messaging address of a user.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct Identity(pub i64);

impl fmt::Display for Identity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Any chat the messaging gateway can post into: a group or a user's private
/// chat.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A user's private chat shares its id with the user.
impl From<Identity> for ChatId {
  fn from(id: Identity) -> Self { Self(id.0) }
}

// ─── Calendar ────────────────────────────────────────────────────────────────

/// A day of the year with no year component, used for birthday matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthDay {
  pub month: u32,
  pub day:   u32,
}

impl MonthDay {
  pub fn of(date: NaiveDate) -> Self {
    Self { month: date.month(), day: date.day() }
  }
}

impl fmt::Display for MonthDay {
  /// `MM-DD`, the same shape SQLite's `strftime('%m-%d', ...)` produces.
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:02}-{:02}", self.month, self.day)
  }
}

// ─── User ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:         Uuid,
  /// Display handle without the leading `@`.
  pub username:        String,
  pub identity:        Identity,
  /// Only the month and day are significant.
  pub birthday:        NaiveDate,
  pub notify_birthday: bool,
}

impl User {
  /// `@username`, as shown in announcements.
  pub fn mention(&self) -> String { format!("@{}", self.username) }
}

/// Input to [`crate::store::UserStore::insert_user`]. The id is assigned by
/// the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
  pub username:        String,
  pub identity:        Identity,
  pub birthday:        NaiveDate,
  #[serde(default)]
  pub notify_birthday: bool,
}
