//! Fires one [`BirthdayCycle`] a day at a fixed local hour.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta};
use hbd_core::{gateway::MessagingGateway, store::UserStore};
use tokio::{
  task::JoinHandle,
  time::{Instant, MissedTickBehavior, interval_at},
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{error, info};

use crate::{
  clock::Clock,
  lifecycle::{BirthdayCycle, CycleOutcome},
};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// How long to wait from `now` until the next `at`. Today's `at` counts only
/// if it is still strictly ahead; otherwise tomorrow's.
pub fn delay_until_next(now: DateTime<FixedOffset>, at: NaiveTime) -> Duration {
  let now_local = now.naive_local();
  let mut next = now_local.date().and_time(at);
  if now_local >= next {
    next += TimeDelta::days(1);
  }
  (next - now_local).to_std().unwrap_or_default()
}

pub struct DailyScheduler<S, G> {
  cycle: Arc<BirthdayCycle<S, G>>,
  at:    NaiveTime,
  clock: Arc<dyn Clock>,
}

impl<S, G> DailyScheduler<S, G>
where
  S: UserStore + 'static,
  G: MessagingGateway + 'static,
{
  pub fn new(cycle: Arc<BirthdayCycle<S, G>>, at: NaiveTime, clock: Arc<dyn Clock>) -> Self {
    Self { cycle, at, clock }
  }

  /// Start the scheduler on `tracker`.
  ///
  /// Every cycle it fires is spawned on the same tracker, so closing and
  /// waiting on the tracker after cancelling `cancel` waits for the
  /// scheduler loop and all in-flight cycles alike.
  pub fn spawn(self, cancel: CancellationToken, tracker: TaskTracker) -> JoinHandle<()> {
    let cycles = tracker.clone();
    tracker.spawn(self.run(cancel, cycles))
  }

  async fn run(self, cancel: CancellationToken, tracker: TaskTracker) {
    let delay = delay_until_next(self.clock.now(), self.at);
    info!(at = %self.at, delay_secs = delay.as_secs(), "birthday scheduler started");

    let mut ticker = interval_at(Instant::now() + delay, DAY);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
      tokio::select! {
        biased;
        _ = cancel.cancelled() => {
          info!("birthday scheduler shutting down");
          break;
        }
        _ = ticker.tick() => {
          let cycle = Arc::clone(&self.cycle);
          let cancel = cancel.clone();
          tracker.spawn(async move {
            match cycle.run(&cancel).await {
              Ok(CycleOutcome::NoEvent) => info!("no birthdays to celebrate today"),
              Ok(CycleOutcome::Completed(report)) => {
                info!(celebrating = report.celebrating.len(), "birthday cycle finished")
              }
              Err(e) => error!(error = %e, "birthday cycle aborted"),
            }
          });
        }
      }
    }
  }
}
