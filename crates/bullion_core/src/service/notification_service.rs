//! Notification use-case service.
//!
//! # Responsibility
//! - Ingest listing payloads into the notification store.
//! - Build the per-viewer feed (visible items + unread count).
//! - Mirror mark-read results locally.
//!
//! # Invariants
//! - A full fetch replaces the collection; pages only append unseen ids.
//! - The feed keeps store order.

use crate::config::CoreConfig;
use crate::model::notification::{Notification, RawNotification};
use crate::model::viewer::Viewer;
use crate::reconcile::notification::{
    filter_for_viewer_with, is_visible_to, normalize, unread_count, LEGACY_ADMIN_ONLY_ID,
};
use crate::repo::notification_repo::NotificationRepository;
use crate::repo::{parse_payload, StoreError};
use log::{debug, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum NotificationServiceError {
    NotificationNotFound(String),
    Store(StoreError),
}

impl Display for NotificationServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotificationNotFound(id) => write!(f, "notification not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NotificationServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::NotificationNotFound(_) => None,
        }
    }
}

impl From<StoreError> for NotificationServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NotificationNotFound(id),
            other => Self::Store(other),
        }
    }
}

/// View-ready notification list for one viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFeed {
    pub items: Vec<Notification>,
    pub unread_count: usize,
}

/// Notification facade over a store implementation.
pub struct NotificationService<R: NotificationRepository> {
    repo: R,
    admin_only_ids: Vec<String>,
}

impl<R: NotificationRepository> NotificationService<R> {
    /// Creates a service with the legacy admin-only id.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            admin_only_ids: vec![LEGACY_ADMIN_ONLY_ID.to_string()],
        }
    }

    pub fn with_config(repo: R, config: &CoreConfig) -> Self {
        Self {
            repo,
            admin_only_ids: config.admin_only_ids.clone(),
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Replaces the collection with freshly fetched records.
    pub fn ingest(&mut self, raw: Vec<RawNotification>) -> usize {
        let normalized = normalize(raw);
        let count = normalized.len();
        self.repo.replace_all(normalized);
        info!(
            "event=notifications_ingest module=service status=ok mode=replace count={}",
            count
        );
        count
    }

    /// Parses a listing payload and replaces the collection.
    pub fn ingest_json(&mut self, payload: &str) -> Result<usize, NotificationServiceError> {
        let raw = parse_payload::<RawNotification>(payload)?;
        Ok(self.ingest(raw))
    }

    /// Parses a follow-up page and appends unseen records.
    pub fn ingest_page_json(&mut self, payload: &str) -> Result<usize, NotificationServiceError> {
        let raw = parse_payload::<RawNotification>(payload)?;
        let added = self.repo.append_page(normalize(raw));
        info!(
            "event=notifications_ingest module=service status=ok mode=append added={}",
            added
        );
        Ok(added)
    }

    /// Returns visible notifications and their unread count.
    pub fn feed_for(&self, viewer: &Viewer) -> NotificationFeed {
        let items =
            filter_for_viewer_with(self.repo.all(), viewer, self.admin_only_ids.as_slice());
        let unread_count = unread_count(&items);
        NotificationFeed {
            items,
            unread_count,
        }
    }

    /// Unread count for the viewer's feed; what the notification bell shows.
    pub fn unread_count_for(&self, viewer: &Viewer) -> usize {
        self.repo
            .all()
            .iter()
            .filter(|n| !n.read && is_visible_to(n, viewer, self.admin_only_ids.as_slice()))
            .count()
    }

    /// Mirrors a successful mark-read call.
    pub fn mark_read(&mut self, id: &str) -> Result<(), NotificationServiceError> {
        self.repo.mark_read(id)?;
        Ok(())
    }

    /// Marks every notification visible to `viewer` as read. Returns how many
    /// changed.
    ///
    /// Matches on visibility, not on id: hidden records sharing an id with a
    /// visible one, and visible records without an id, are handled per record.
    pub fn mark_all_read_for(&mut self, viewer: &Viewer) -> usize {
        let admin_only_ids = self.admin_only_ids.as_slice();
        let changed = self
            .repo
            .mark_read_where(&|n| is_visible_to(n, viewer, admin_only_ids));
        debug!(
            "event=notifications_mark_all_read module=service status=ok role={} changed={}",
            viewer.role.as_str(),
            changed
        );
        changed
    }
}
