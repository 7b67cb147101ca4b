//! [`SqliteStore`], the SQLite implementation of [`UserStore`] and
//! [`SubscriptionStore`].

use std::path::Path;

use chrono::Utc;
use hbd_core::{
  store::{SubscriptionStore, UserStore},
  subscription::Subscription,
  user::{Identity, MonthDay, NewUser, User},
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  encode::{
    encode_date, encode_dt, encode_uuid, is_unique_violation, RawUser,
    USER_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// User and subscription storage backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("sqlite schema initialised");
    Ok(())
  }

  /// Run a query returning user rows and decode them.
  async fn query_users(
    &self,
    sql: String,
    params: Vec<rusqlite::types::Value>,
  ) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  /// Fetch at most one user row matching `sql`.
  async fn query_user(
    &self,
    sql: String,
    param: rusqlite::types::Value,
  ) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![param], RawUser::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }
}

/// Translate a uniqueness violation into [`Error::AlreadyExists`]; everything
/// else stays a database error.
fn unique_as_exists(e: tokio_rusqlite::Error, what: impl FnOnce() -> String) -> Error {
  match e {
    tokio_rusqlite::Error::Rusqlite(ref inner) if is_unique_violation(inner) => {
      Error::AlreadyExists(what())
    }
    other => Error::Database(other),
  }
}

// ─── UserStore impl ──────────────────────────────────────────────────────────

impl UserStore for SqliteStore {
  type Error = Error;

  async fn insert_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:         Uuid::new_v4(),
      username:        input.username,
      identity:        input.identity,
      birthday:        input.birthday,
      notify_birthday: input.notify_birthday,
    };

    let id_str       = encode_uuid(user.user_id);
    let username     = user.username.clone();
    let telegram_id  = user.identity.0;
    let birthday_str = encode_date(user.birthday);
    let notify       = user.notify_birthday;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, username, telegram_id, birthday, notify_birthday)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, username, telegram_id, birthday_str, notify],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| unique_as_exists(e, || format!("user {}", user.mention())))?;

    Ok(user)
  }

  async fn insert_many(&self, users: Vec<NewUser>) -> Result<usize> {
    let rows: Vec<(String, String, i64, String, bool)> = users
      .into_iter()
      .map(|u| {
        (
          encode_uuid(Uuid::new_v4()),
          u.username,
          u.identity.0,
          encode_date(u.birthday),
          u.notify_birthday,
        )
      })
      .collect();

    self
      .conn
      .call(move |conn| {
        // Dropping the transaction on error rolls back the whole batch.
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO users (user_id, username, telegram_id, birthday, notify_birthday)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for (id, username, telegram_id, birthday, notify) in &rows {
            stmt.execute(rusqlite::params![id, username, telegram_id, birthday, notify])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await
      .map_err(|e| unique_as_exists(e, || "user in batch".to_owned()))
  }

  async fn find_by_identity(&self, identity: Identity) -> Result<User> {
    self
      .query_user(
        format!("SELECT {USER_COLUMNS} FROM users WHERE telegram_id = ?1"),
        identity.0.into(),
      )
      .await?
      .ok_or_else(|| Error::UserNotFound(format!("telegram_id {identity}")))
  }

  async fn find_by_handle(&self, username: &str) -> Result<User> {
    self
      .query_user(
        format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
        username.to_owned().into(),
      )
      .await?
      .ok_or_else(|| Error::UserNotFound(format!("username @{username}")))
  }

  async fn list_with_birthday_on(&self, day: MonthDay) -> Result<Vec<User>> {
    self
      .query_users(
        format!(
          "SELECT {USER_COLUMNS} FROM users
           WHERE strftime('%m-%d', birthday) = ?1
           ORDER BY username"
        ),
        vec![day.to_string().into()],
      )
      .await
  }

  async fn list_subscribers_of(&self, targets: &[User]) -> Result<Vec<User>> {
    if targets.is_empty() {
      return Ok(Vec::new());
    }

    let placeholders = (1..=targets.len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");
    let params = targets
      .iter()
      .map(|u| encode_uuid(u.user_id).into())
      .collect();

    // `IN (subquery)` de-duplicates subscribers of several targets.
    self
      .query_users(
        format!(
          "SELECT {USER_COLUMNS} FROM users
           WHERE user_id IN (
             SELECT subscriber FROM subscriptions
             WHERE subscribe_to IN ({placeholders})
           )
           ORDER BY username"
        ),
        params,
      )
      .await
  }

  async fn list_candidates(
    &self,
    exclude: Identity,
    limit: usize,
  ) -> Result<Vec<User>> {
    self
      .query_users(
        format!(
          "SELECT {USER_COLUMNS} FROM users
           WHERE telegram_id != ?1
           ORDER BY birthday
           LIMIT ?2"
        ),
        vec![exclude.0.into(), (limit as i64).into()],
      )
      .await
  }

  async fn set_notify_flag(&self, identity: Identity, notify: bool) -> Result<User> {
    self
      .query_user(
        format!(
          "UPDATE users SET notify_birthday = {}
           WHERE telegram_id = ?1
           RETURNING {USER_COLUMNS}",
          i64::from(notify)
        ),
        identity.0.into(),
      )
      .await?
      .ok_or_else(|| Error::UserNotFound(format!("telegram_id {identity}")))
  }
}

// ─── SubscriptionStore impl ──────────────────────────────────────────────────

impl SubscriptionStore for SqliteStore {
  type Error = Error;

  async fn insert_edge(
    &self,
    subscriber:   Identity,
    subscribe_to: Identity,
  ) -> Result<Subscription> {
    let subscription = Subscription {
      subscription_id: Uuid::new_v4(),
      subscriber,
      subscribe_to,
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(subscription.subscription_id);
    let at_str = encode_dt(subscription.created_at);

    // Resolving both identities inside the INSERT keeps it one statement;
    // zero rows inserted means one of them is unknown.
    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO subscriptions (subscription_id, subscriber, subscribe_to, created_at)
           SELECT ?1, a.user_id, b.user_id, ?4
           FROM users a, users b
           WHERE a.telegram_id = ?2 AND b.telegram_id = ?3",
          rusqlite::params![id_str, subscriber.0, subscribe_to.0, at_str],
        )?)
      })
      .await
      .map_err(|e| {
        unique_as_exists(e, || format!("subscription {subscriber} -> {subscribe_to}"))
      })?;

    if inserted == 0 {
      return Err(Error::UserNotFound(format!(
        "telegram_id {subscriber} or {subscribe_to}"
      )));
    }

    Ok(subscription)
  }

  async fn delete_edge(&self, subscriber: Identity, subscribe_to: Identity) -> Result<()> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM subscriptions
           WHERE subscriber   = (SELECT user_id FROM users WHERE telegram_id = ?1)
             AND subscribe_to = (SELECT user_id FROM users WHERE telegram_id = ?2)",
          rusqlite::params![subscriber.0, subscribe_to.0],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::SubscriptionNotFound { subscriber, subscribe_to });
    }
    Ok(())
  }
}
