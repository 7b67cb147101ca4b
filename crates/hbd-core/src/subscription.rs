//! Subscription edges, the directed "notify me about them" graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::Identity;

/// `subscriber` wants to be notified of `subscribe_to`'s birthday.
///
/// At most one edge exists per ordered pair and the two ends always differ;
/// both rules are enforced by the store schema as well as by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
  pub subscription_id: Uuid,
  pub subscriber:      Identity,
  pub subscribe_to:    Identity,
  pub created_at:      DateTime<Utc>,
}
