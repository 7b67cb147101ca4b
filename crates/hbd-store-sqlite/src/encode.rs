//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, birthdays as `YYYY-MM-DD`, and
//! UUIDs as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use hbd_core::user::{Identity, User};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

// ─── NaiveDate ────────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Constraint violations ───────────────────────────────────────────────────

/// `true` if the error is a UNIQUE or PRIMARY KEY violation.
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        || f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}

// ─── Raw row types ────────────────────────────────────────────────────────────

/// Column list matching [`RawUser::from_row`].
pub const USER_COLUMNS: &str =
  "user_id, username, telegram_id, birthday, notify_birthday";

/// A `users` row as read from SQLite, before decoding.
pub struct RawUser {
  pub user_id:         String,
  pub username:        String,
  pub telegram_id:     i64,
  pub birthday:        String,
  pub notify_birthday: bool,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:         row.get(0)?,
      username:        row.get(1)?,
      telegram_id:     row.get(2)?,
      birthday:        row.get(3)?,
      notify_birthday: row.get(4)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:         decode_uuid(&self.user_id)?,
      username:        self.username,
      identity:        Identity(self.telegram_id),
      birthday:        decode_date(&self.birthday)?,
      notify_birthday: self.notify_birthday,
    })
  }
}
