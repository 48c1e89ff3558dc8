//! Core use-case services.
//!
//! # Responsibility
//! - Combine stores and reconcile functions into use-case level APIs.
//! - Keep UI layers decoupled from payload shapes and store details.

pub mod buy_request_service;
pub mod notification_service;
