//! Canonical domain model for marketplace records mirrored on the client.
//!
//! # Responsibility
//! - Define raw shapes exactly as the backend delivers them.
//! - Define canonical shapes that every view consumes.
//!
//! # Invariants
//! - Raw shapes are only read by `crate::reconcile`.
//! - Canonical shapes carry exactly one id and one numeric timestamp.

pub mod buy_request;
pub mod notification;
pub mod value;
pub mod viewer;
