//! Who has a birthday today, and who wants to hear about it.

use std::{collections::HashSet, sync::Arc};

use hbd_core::{
  store::UserStore,
  user::{MonthDay, User},
  Error, Result,
};
use tracing::debug;

use crate::clock::Clock;

/// Read-only view over the user store, anchored to "today" by a [`Clock`].
///
/// Both queries are pure functions of storage content and the current date.
pub struct BirthdayResolver<S> {
  store: Arc<S>,
  clock: Arc<dyn Clock>,
}

impl<S: UserStore> BirthdayResolver<S> {
  pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
    Self { store, clock }
  }

  /// Users whose birthday month and day equal today's. The year is ignored,
  /// so a Feb 29 birthday only matches in leap years.
  pub async fn users_with_birthday_today(&self) -> Result<Vec<User>> {
    let today = MonthDay::of(self.clock.today());
    let users = self
      .store
      .list_with_birthday_on(today)
      .await
      .map_err(Into::<Error>::into)?;
    debug!(%today, count = users.len(), "resolved birthday users");
    Ok(users)
  }

  /// Everyone subscribed to at least one of `birthday_users`, each listed
  /// once.
  pub async fn subscribers_of(&self, birthday_users: &[User]) -> Result<Vec<User>> {
    if birthday_users.is_empty() {
      return Ok(Vec::new());
    }

    let mut subscribers = self
      .store
      .list_subscribers_of(birthday_users)
      .await
      .map_err(Into::<Error>::into)?;

    let mut seen = HashSet::new();
    subscribers.retain(|u| seen.insert(u.identity));
    debug!(count = subscribers.len(), "resolved subscribers");
    Ok(subscribers)
  }
}
