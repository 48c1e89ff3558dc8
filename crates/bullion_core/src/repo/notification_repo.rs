//! Notification store contract and in-memory implementation.

use crate::model::notification::Notification;
use crate::repo::{StoreError, StoreResult};
use std::collections::HashSet;

/// Repository interface for the session's notification collection.
pub trait NotificationRepository {
    /// Replaces the whole collection with a fresh fetch.
    fn replace_all(&mut self, items: Vec<Notification>);
    /// Appends a follow-up page, skipping ids already held. Returns the
    /// number of records added.
    fn append_page(&mut self, items: Vec<Notification>) -> usize;
    fn all(&self) -> &[Notification];
    fn get(&self, id: &str) -> Option<&Notification>;
    /// Marks every record with `id` as read.
    fn mark_read(&mut self, id: &str) -> StoreResult<()>;
    /// Marks every unread record matching `predicate` as read. Returns the
    /// number of records that changed.
    fn mark_read_where(&mut self, predicate: &dyn Fn(&Notification) -> bool) -> usize;
}

/// Session-scoped notification store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationRepository {
    items: Vec<Notification>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl NotificationRepository for InMemoryNotificationRepository {
    fn replace_all(&mut self, items: Vec<Notification>) {
        self.items = items;
    }

    fn append_page(&mut self, items: Vec<Notification>) -> usize {
        let mut held: HashSet<String> = self.items.iter().map(|n| n.id.clone()).collect();
        let before = self.items.len();
        for item in items {
            if item.id.is_empty() || held.insert(item.id.clone()) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }

    fn all(&self) -> &[Notification] {
        &self.items
    }

    fn get(&self, id: &str) -> Option<&Notification> {
        self.items.iter().find(|notification| notification.id == id)
    }

    fn mark_read(&mut self, id: &str) -> StoreResult<()> {
        let mut found = false;
        for notification in self.items.iter_mut().filter(|n| n.id == id) {
            notification.mark_read();
            found = true;
        }
        if !found {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn mark_read_where(&mut self, predicate: &dyn Fn(&Notification) -> bool) -> usize {
        let mut changed = 0;
        for notification in self.items.iter_mut().filter(|n| !n.read && predicate(n)) {
            notification.mark_read();
            changed += 1;
        }
        changed
    }
}
