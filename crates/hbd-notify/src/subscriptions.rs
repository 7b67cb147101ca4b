//! Creating and removing subscription edges.

use std::sync::Arc;

use hbd_core::{
  store::SubscriptionStore,
  subscription::Subscription,
  user::Identity,
  Error, Result,
};
use tracing::info;

pub struct SubscriptionManager<S> {
  store: Arc<S>,
}

impl<S> Clone for SubscriptionManager<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: SubscriptionStore> SubscriptionManager<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Subscribe `subscriber` to `target`'s birthday.
  ///
  /// Self-subscription is rejected before the store is touched. The store
  /// reports `NotFound` for an unknown identity and `AlreadyExists` for a
  /// duplicate edge.
  pub async fn subscribe(
    &self,
    subscriber: Identity,
    target: Identity,
  ) -> Result<Subscription> {
    if subscriber == target {
      return Err(Error::SelfSubscription);
    }

    let subscription = self
      .store
      .insert_edge(subscriber, target)
      .await
      .map_err(Into::<Error>::into)?;

    info!(%subscriber, %target, id = %subscription.subscription_id, "subscription created");
    Ok(subscription)
  }

  /// Remove the edge `subscriber → target`; `NotFound` if there is none.
  pub async fn unsubscribe(&self, subscriber: Identity, target: Identity) -> Result<()> {
    self
      .store
      .delete_edge(subscriber, target)
      .await
      .map_err(Into::<Error>::into)?;

    info!(%subscriber, %target, "subscription removed");
    Ok(())
  }
}
