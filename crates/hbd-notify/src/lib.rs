//! Birthday notification engine.
//!
//! Resolves who has a birthday today and who subscribed to them, gathers
//! everyone into the shared birthday group, and evicts them again once the
//! grace period is over. [`DailyScheduler`] drives one
//! [`BirthdayCycle`] per day; both are generic over the storage and
//! messaging traits in `hbd-core`.
//!
//! ```rust,ignore
//! let cycle = Arc::new(BirthdayCycle::new(store, gateway, clock.clone(), &cfg));
//! DailyScheduler::new(cycle, cfg.notify_at()?, clock).spawn(cancel, tracker);
//! ```

pub mod clock;
pub mod config;
pub mod lifecycle;
pub mod resolver;
pub mod scheduler;
pub mod subscriptions;
pub mod users;

pub use clock::{Clock, SystemClock};
pub use config::NotifyConfig;
pub use lifecycle::{BirthdayCycle, CycleOutcome, CycleReport, CycleState};
pub use resolver::BirthdayResolver;
pub use scheduler::DailyScheduler;
pub use subscriptions::SubscriptionManager;
pub use users::{StaticUserSource, UserService};
