//! Wall-clock access, injectable so date-dependent logic can be tested.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

pub trait Clock: Send + Sync {
  /// The current instant in the service's configured time zone.
  fn now(&self) -> DateTime<FixedOffset>;

  /// Today's calendar date in the configured time zone.
  fn today(&self) -> NaiveDate { self.now().date_naive() }
}

/// The real clock, shifted to a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
  offset: FixedOffset,
}

impl SystemClock {
  pub fn new(offset: FixedOffset) -> Self { Self { offset } }
}

impl Clock for SystemClock {
  fn now(&self) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&self.offset)
  }
}
