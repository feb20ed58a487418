//! Payment-ledger and projection engine.
//!
//! Everything here is synchronous and pure: callers hand in already-loaded,
//! owner-scoped plans and payments and get derived views back.

use thiserror::Error;

pub mod chart;
pub mod compare;
pub mod engine;
pub mod filter;
pub mod projection;
pub mod scenarios;

pub use engine::{build_ledger, Ledger, LedgerSummary, PaymentEntry};
pub use filter::{filter_and_sort, PlanListing, PlanQuery};
pub use projection::{project_payoff, Projection};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("target months must be a positive number")]
    DivisionByZero,
}
