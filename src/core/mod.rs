//! Posting, schedule and alert engines plus the services built on them.

pub mod alerts;
pub mod locks;
pub mod posting;
pub mod schedule;
pub mod services;
pub mod tracker;

pub use alerts::{AlertOutcome, AlertSettings, BudgetAlertService, BudgetCheck, SweepReport};
pub use posting::{Effect, PostingEngine};
pub use schedule::{next_due_date, ScheduleEngine};
pub use tracker::Tracker;
