//! Pure reconciliation of fetched records into view-ready data.
//!
//! # Responsibility
//! - Convert raw backend records into canonical model records.
//! - Derive per-viewer lists and counts.
//!
//! # Invariants
//! - No I/O and no hidden state: identical inputs give identical outputs
//!   (the wall clock is only read by the `normalize*` entry points without an
//!   explicit `now_ms`).

pub mod buy_request;
pub mod notification;
