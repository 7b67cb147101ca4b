//! User registration and per-user settings.

use std::{convert::Infallible, sync::Arc};

use hbd_core::{
  source::UserSource,
  store::UserStore,
  user::{Identity, NewUser, User},
  Error, Result,
};
use tracing::{debug, info};

/// How many users `/users` lists at most.
const CANDIDATE_LIMIT: usize = 10;

pub struct UserService<S> {
  store: Arc<S>,
}

impl<S> Clone for UserService<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: UserStore> UserService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Pull users from `source` and insert the ones not yet stored.
  ///
  /// The whole batch is tried first. If it collides with existing rows the
  /// users are inserted one at a time so newcomers still land. Returns how
  /// many users were added.
  pub async fn sync_users<U: UserSource>(&self, source: &U) -> Result<usize> {
    let users = source.fetch_users().await.map_err(Error::storage)?;
    let fetched = users.len();

    let batch = self.store.insert_many(users.clone()).await;
    let inserted = match batch.map_err(Into::<Error>::into) {
      Ok(n) => n,
      Err(e) if e.is_already_exists() => {
        debug!("user batch collides with stored users, inserting one by one");
        let mut n = 0;
        for user in users {
          let single = self.store.insert_user(user).await;
          match single.map_err(Into::<Error>::into) {
            Ok(_) => n += 1,
            Err(e) if e.is_already_exists() => {}
            Err(e) => return Err(e),
          }
        }
        n
      }
      Err(e) => return Err(e),
    };

    info!(fetched, inserted, "users synced");
    Ok(inserted)
  }

  /// Fails with `NotFound` for unregistered identities.
  pub async fn find(&self, identity: Identity) -> Result<User> {
    self.store.find_by_identity(identity).await.map_err(Into::into)
  }

  pub async fn identity_for_handle(&self, username: &str) -> Result<Identity> {
    let user = self
      .store
      .find_by_handle(username)
      .await
      .map_err(Into::<Error>::into)?;
    Ok(user.identity)
  }

  pub async fn set_notify(&self, identity: Identity, notify: bool) -> Result<User> {
    let user = self
      .store
      .set_notify_flag(identity, notify)
      .await
      .map_err(Into::<Error>::into)?;
    info!(%identity, notify, "notification flag changed");
    Ok(user)
  }

  /// Other users `identity` could subscribe to.
  pub async fn candidates(&self, identity: Identity) -> Result<Vec<User>> {
    self
      .store
      .list_candidates(identity, CANDIDATE_LIMIT)
      .await
      .map_err(Into::into)
  }
}

// ─── Sources ─────────────────────────────────────────────────────────────────

/// A fixed user list, typically the `[[users]]` entries of the config file.
#[derive(Debug, Clone, Default)]
pub struct StaticUserSource {
  users: Vec<NewUser>,
}

impl StaticUserSource {
  pub fn new(users: Vec<NewUser>) -> Self { Self { users } }
}

impl UserSource for StaticUserSource {
  type Error = Infallible;

  async fn fetch_users(&self) -> Result<Vec<NewUser>, Infallible> {
    Ok(self.users.clone())
  }
}
