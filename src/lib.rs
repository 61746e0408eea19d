#![doc(test(attr(deny(warnings))))]

//! Budget Ledger keeps account balances in step with posted transactions,
//! turns recurring plans into postings on schedule, and sweeps monthly
//! budgets for threshold alerts.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod notify;
pub mod storage;
pub mod utils;

pub use crate::core::Tracker;
pub use crate::errors::{LedgerError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log. `filter` is used
/// when `RUST_LOG` is unset.
pub fn init(filter: Option<&str>) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(filter);
        tracing::info!(version = env!("CARGO_PKG_VERSION"), "Budget Ledger tracing initialized.");
    });
}
