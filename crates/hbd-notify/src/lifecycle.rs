//! One birthday cycle: resolve, invite, wait, evict.
//!
//! ```text
//! Idle ─► Resolving ─┬─► NoEvent
//!                    └─► Announcing ─► GracePeriod ─► Evicting ─► Idle
//! ```
//!
//! Gateway failures for one member never stop the batch: a member who
//! cannot be admitted gets a "contact support" message instead of the invite,
//! and a member who cannot be removed is asked to leave. The configured owner
//! is never removed.

use std::{collections::HashSet, fmt, sync::Arc, time::Duration};

use hbd_core::{
  gateway::MessagingGateway,
  store::UserStore,
  user::{ChatId, Identity, User},
  Result,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::{clock::Clock, config::NotifyConfig, resolver::BirthdayResolver};

// ─── Texts ───────────────────────────────────────────────────────────────────

pub(crate) fn invite_text(mentions: &str, link: &str) -> String {
  format!(
    "Join the group to congratulate the birthday for users: {mentions}. Link: {link}"
  )
}

pub(crate) fn fallback_text(mentions: &str) -> String {
  format!(
    "To join the birthday group celebrating {mentions}, please contact support."
  )
}

pub(crate) fn broadcast_text(mentions: &str) -> String {
  format!("happy birthday {mentions}")
}

pub(crate) const LEAVE_TEXT: &str =
  "Please leave the birthday group. We'll wait for the next birthday!";

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
  Idle,
  Resolving,
  NoEvent,
  Announcing,
  GracePeriod,
  Evicting,
}

impl fmt::Display for CycleState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Idle => "idle",
      Self::Resolving => "resolving",
      Self::NoEvent => "no_event",
      Self::Announcing => "announcing",
      Self::GracePeriod => "grace_period",
      Self::Evicting => "evicting",
    };
    f.write_str(s)
  }
}

/// What a completed cycle did, member by member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
  pub celebrating:     Vec<Identity>,
  /// Members who got a working invite link.
  pub invited:         Vec<Identity>,
  /// Members who got the "contact support" message instead.
  pub degraded:        Vec<Identity>,
  pub evicted:         Vec<Identity>,
  /// Members whose removal failed and who were asked to leave.
  pub eviction_failed: Vec<Identity>,
  /// The grace period was cut short by cancellation.
  pub cut_short:       bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
  /// Nobody to celebrate, or nobody to celebrate with.
  NoEvent,
  Completed(CycleReport),
}

// ─── Batch ───────────────────────────────────────────────────────────────────

/// The people involved in one cycle. Owned by that cycle alone.
#[derive(Debug, Clone)]
pub(crate) struct MembershipBatch {
  pub celebrating: Vec<User>,
  /// Birthday users and subscribers, each identity once.
  pub members:     Vec<User>,
  pub owner:       Identity,
}

impl MembershipBatch {
  pub fn new(celebrating: Vec<User>, subscribers: Vec<User>, owner: Identity) -> Self {
    let mut seen = HashSet::new();
    let members = celebrating
      .iter()
      .cloned()
      .chain(subscribers)
      .filter(|u| seen.insert(u.identity))
      .collect();
    Self { celebrating, members, owner }
  }

  /// `@alice, @bob`
  pub fn mentions(&self) -> String {
    self
      .celebrating
      .iter()
      .map(User::mention)
      .collect::<Vec<_>>()
      .join(", ")
  }

  pub fn evictable(&self) -> impl Iterator<Item = &User> {
    self.members.iter().filter(move |u| u.identity != self.owner)
  }
}

// ─── Cycle ───────────────────────────────────────────────────────────────────

pub struct BirthdayCycle<S, G> {
  resolver:     BirthdayResolver<S>,
  gateway:      Arc<G>,
  space:        ChatId,
  owner:        Identity,
  grace_period: Duration,
}

impl<S, G> BirthdayCycle<S, G>
where
  S: UserStore,
  G: MessagingGateway,
{
  pub fn new(
    store: Arc<S>,
    gateway: Arc<G>,
    clock: Arc<dyn Clock>,
    config: &NotifyConfig,
  ) -> Self {
    Self {
      resolver: BirthdayResolver::new(store, clock),
      gateway,
      space: config.birthday_group_id,
      owner: config.group_owner_id,
      grace_period: config.grace_period(),
    }
  }

  /// Run one full cycle.
  ///
  /// Cancelling `cancel` during the grace period skips the rest of the wait;
  /// eviction still happens before this returns. A storage failure while
  /// resolving aborts the cycle before anyone is contacted.
  #[instrument(name = "birthday_cycle", skip_all, fields(space = %self.space))]
  pub async fn run(&self, cancel: &CancellationToken) -> Result<CycleOutcome> {
    debug!(state = %CycleState::Resolving, "cycle state");
    let batch = match self.resolve().await {
      Ok(Some(batch)) => batch,
      Ok(None) => {
        debug!(state = %CycleState::NoEvent, "cycle state");
        return Ok(CycleOutcome::NoEvent);
      }
      Err(e) => {
        error!(error = %e, "birthday resolution failed, aborting cycle");
        return Err(e);
      }
    };

    let mut report = CycleReport {
      celebrating: batch.celebrating.iter().map(|u| u.identity).collect(),
      ..CycleReport::default()
    };

    debug!(state = %CycleState::Announcing, members = batch.members.len(), "cycle state");
    self.announce(&batch, &mut report).await;

    debug!(state = %CycleState::GracePeriod, secs = self.grace_period.as_secs(), "cycle state");
    report.cut_short = tokio::select! {
      _ = cancel.cancelled() => true,
      _ = tokio::time::sleep(self.grace_period) => false,
    };
    if report.cut_short {
      info!("cancelled during grace period, evicting now");
    }

    debug!(state = %CycleState::Evicting, "cycle state");
    self.evict(&batch, &mut report).await;

    info!(
      invited = report.invited.len(),
      degraded = report.degraded.len(),
      evicted = report.evicted.len(),
      eviction_failed = report.eviction_failed.len(),
      "birthday cycle complete"
    );
    debug!(state = %CycleState::Idle, "cycle state");
    Ok(CycleOutcome::Completed(report))
  }

  async fn resolve(&self) -> Result<Option<MembershipBatch>> {
    let celebrating = self.resolver.users_with_birthday_today().await?;
    if celebrating.is_empty() {
      return Ok(None);
    }

    let subscribers = self.resolver.subscribers_of(&celebrating).await?;
    if celebrating.len() == 1 && subscribers.is_empty() {
      debug!("one birthday and no subscribers, nothing to do");
      return Ok(None);
    }

    Ok(Some(MembershipBatch::new(celebrating, subscribers, self.owner)))
  }

  async fn announce(&self, batch: &MembershipBatch, report: &mut CycleReport) {
    let mentions = batch.mentions();
    let fallback = fallback_text(&mentions);

    let invite = match self.gateway.invite_link(self.space, &mentions).await {
      Ok(link) => Some(invite_text(&mentions, &link)),
      Err(e) => {
        warn!(error = %e, "could not generate invite link, sending fallback to everyone");
        None
      }
    };

    for member in &batch.members {
      let admitted = self.gateway.admit_member(self.space, member.identity).await;
      if let Err(e) = admitted {
        // The owner is usually already in the group; admitting them may
        // fail harmlessly.
        if member.identity != batch.owner {
          warn!(member = %member.identity, error = %e, "could not admit member");
          self.gateway.send_message(member.identity.into(), &fallback).await;
          report.degraded.push(member.identity);
          continue;
        }
      }

      match &invite {
        Some(text) => {
          self.gateway.send_message(member.identity.into(), text).await;
          report.invited.push(member.identity);
        }
        None => {
          self.gateway.send_message(member.identity.into(), &fallback).await;
          report.degraded.push(member.identity);
        }
      }
    }

    self
      .gateway
      .send_message(self.space, &broadcast_text(&mentions))
      .await;
  }

  async fn evict(&self, batch: &MembershipBatch, report: &mut CycleReport) {
    for member in batch.evictable() {
      match self.gateway.remove_member(self.space, member.identity).await {
        Ok(()) => report.evicted.push(member.identity),
        Err(e) => {
          warn!(member = %member.identity, error = %e, "could not remove member, asking them to leave");
          self.gateway.send_message(member.identity.into(), LEAVE_TEXT).await;
          report.eviction_failed.push(member.identity);
        }
      }
    }
  }
}
