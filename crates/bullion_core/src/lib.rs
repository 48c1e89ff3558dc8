//! Client-side core for the bullion marketplace app.
//! Reconciles notifications and buy/sell requests fetched from the backend
//! into view-ready lists and counts.

pub mod config;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::buy_request::{BuyRequest, ItemSnapshot, RawBuyRequest, RequestStatus, RequestType};
pub use model::notification::{Notification, NotificationType, RawNotification, TypeDisplay};
pub use model::viewer::{Viewer, ViewerRole};
pub use reconcile::buy_request::{
    bucket_buy_requests, filter_buy_requests, normalize_buy_requests, normalize_buy_requests_at,
    requests_for_viewer, BuyRequestBatch, BuyRequestRejection, RejectionReason, RequestFilter,
    StatusCounts,
};
pub use reconcile::notification::{
    dedupe_by_id, filter_for_viewer, filter_for_viewer_with, normalize, normalize_at,
    unread_count, LEGACY_ADMIN_ONLY_ID,
};
pub use repo::buy_request_repo::{BuyRequestRepository, InMemoryBuyRequestRepository};
pub use repo::notification_repo::{InMemoryNotificationRepository, NotificationRepository};
pub use repo::{StoreError, StoreResult};
pub use service::buy_request_service::{BuyRequestService, BuyRequestServiceError, IngestReport};
pub use service::notification_service::{
    NotificationFeed, NotificationService, NotificationServiceError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
