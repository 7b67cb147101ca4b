//! Engine configuration, deserialised from the `[notify]` table of the bot's
//! config file.

use std::time::Duration;

use chrono::{FixedOffset, NaiveTime};
use hbd_core::{
  user::{ChatId, Identity},
  Error, Result,
};
use serde::Deserialize;

const DAY_SECS: u64 = 24 * 60 * 60;

fn default_notify_hour() -> u32 { 8 }

fn default_grace_period_secs() -> u64 { 60 * 60 }

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
  /// The shared group birthday people and their subscribers are invited to.
  pub birthday_group_id: ChatId,
  /// Never evicted from the birthday group.
  pub group_owner_id:    Identity,
  /// Local hour (0–23) at which the daily cycle fires.
  #[serde(default = "default_notify_hour")]
  pub notify_hour:       u32,
  /// How long invitees stay in the group before eviction.
  #[serde(default = "default_grace_period_secs")]
  pub grace_period_secs: u64,
  /// Offset of the service's time zone from UTC, in whole hours.
  #[serde(default)]
  pub utc_offset_hours:  i32,
}

impl NotifyConfig {
  /// Reject values the engine cannot run with.
  pub fn validate(&self) -> Result<()> {
    self.notify_at()?;
    self.utc_offset()?;
    // Cycles fire once a day; a longer grace period would overlap the next.
    if self.grace_period_secs == 0 || self.grace_period_secs >= DAY_SECS {
      return Err(Error::InvalidConfig(format!(
        "grace_period_secs must be between 1 and {}, got {}",
        DAY_SECS - 1,
        self.grace_period_secs
      )));
    }
    Ok(())
  }

  pub fn notify_at(&self) -> Result<NaiveTime> {
    NaiveTime::from_hms_opt(self.notify_hour, 0, 0).ok_or_else(|| {
      Error::InvalidConfig(format!(
        "notify_hour must be between 0 and 23, got {}",
        self.notify_hour
      ))
    })
  }

  pub fn utc_offset(&self) -> Result<FixedOffset> {
    self
      .utc_offset_hours
      .checked_mul(3600)
      .and_then(FixedOffset::east_opt)
      .ok_or_else(|| {
        Error::InvalidConfig(format!(
          "utc_offset_hours out of range: {}",
          self.utc_offset_hours
        ))
      })
  }

  pub fn grace_period(&self) -> Duration {
    Duration::from_secs(self.grace_period_secs)
  }
}
