//! Ledger domain models, calendar arithmetic, and due-date classification.

pub mod account;
pub mod budget;
pub mod calendar;
pub mod category;
pub mod due_status;
pub mod plan;
pub mod transaction;
pub mod user;

pub use account::{Account, AccountKind};
pub use budget::Budget;
pub use calendar::{Calendar, CalendarPeriod, FixedCalendar, SystemCalendar};
pub use category::{Category, CategoryKind};
pub use due_status::DueStatus;
pub use plan::{Frequency, PlanInput, RecurringPlan};
pub use transaction::{Transaction, TransactionInput};
pub use user::User;
