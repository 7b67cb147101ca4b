//! The storage traits.
//!
//! Implemented by storage backends (e.g. `hbd-store-sqlite`). The engine and
//! the chat front-end depend on these abstractions, not on any concrete
//! backend. Every method is a single atomic statement (or a single
//! transaction); nothing here spans calls.
//!
//! Backend errors must convert into the shared [`crate::Error`] taxonomy so
//! callers can tell `NotFound` and `AlreadyExists` apart from genuine storage
//! failures.

use std::future::Future;

use crate::{
  subscription::Subscription,
  user::{Identity, MonthDay, NewUser, User},
};

// ─── Users ───────────────────────────────────────────────────────────────────

pub trait UserStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  /// Insert one user. Fails with `AlreadyExists` if the handle or identity is
  /// taken.
  fn insert_user(
    &self,
    user: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Insert a batch of users in one transaction. Any uniqueness violation
  /// rolls back the whole batch and surfaces as `AlreadyExists`. Returns the
  /// number of rows inserted.
  fn insert_many(
    &self,
    users: Vec<NewUser>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Fails with `NotFound` if no user has this identity.
  fn find_by_identity(
    &self,
    identity: Identity,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Fails with `NotFound` if no user has this handle.
  fn find_by_handle<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'a;

  /// Every user whose birthday falls on `day`, in any year.
  fn list_with_birthday_on(
    &self,
    day: MonthDay,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Distinct users holding a subscription to any of `targets`.
  fn list_subscribers_of<'a>(
    &'a self,
    targets: &'a [User],
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + 'a;

  /// Up to `limit` users other than `exclude`, ordered by birthday.
  fn list_candidates(
    &self,
    exclude: Identity,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Set the notification opt-in flag. Fails with `NotFound` if no row was
  /// touched.
  fn set_notify_flag(
    &self,
    identity: Identity,
    notify: bool,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

pub trait SubscriptionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  /// Create the edge `subscriber → subscribe_to`.
  ///
  /// Fails with `NotFound` if either identity is unknown and with
  /// `AlreadyExists` if the edge is already present.
  fn insert_edge(
    &self,
    subscriber: Identity,
    subscribe_to: Identity,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  /// Remove the edge `subscriber → subscribe_to`. Fails with `NotFound` if
  /// zero rows were affected.
  fn delete_edge(
    &self,
    subscriber: Identity,
    subscribe_to: Identity,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
