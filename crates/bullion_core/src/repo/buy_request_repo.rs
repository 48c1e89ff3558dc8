//! Buy/sell request store contract and in-memory implementation.

use crate::model::buy_request::{BuyRequest, RequestStatus};
use crate::repo::{StoreError, StoreResult};
use std::collections::HashSet;

/// Repository interface for the session's request collection.
pub trait BuyRequestRepository {
    fn replace_all(&mut self, items: Vec<BuyRequest>);
    /// Appends a follow-up page, skipping ids already held.
    fn append_page(&mut self, items: Vec<BuyRequest>) -> usize;
    fn all(&self) -> &[BuyRequest];
    fn get(&self, id: &str) -> Option<&BuyRequest>;
    /// Overwrites status and `updated_at` of one request.
    fn set_status(&mut self, id: &str, status: RequestStatus, updated_at: i64)
        -> StoreResult<()>;
}

/// Session-scoped request store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBuyRequestRepository {
    items: Vec<BuyRequest>,
}

impl InMemoryBuyRequestRepository {
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

impl BuyRequestRepository for InMemoryBuyRequestRepository {
    fn replace_all(&mut self, items: Vec<BuyRequest>) {
        self.items = items;
    }

    fn append_page(&mut self, items: Vec<BuyRequest>) -> usize {
        let mut held: HashSet<String> = self.items.iter().map(|r| r.id.clone()).collect();
        let before = self.items.len();
        self.items
            .extend(items.into_iter().filter(|item| held.insert(item.id.clone())));
        self.items.len() - before
    }

    fn all(&self) -> &[BuyRequest] {
        &self.items
    }

    fn get(&self, id: &str) -> Option<&BuyRequest> {
        self.items.iter().find(|request| request.id == id)
    }

    fn set_status(
        &mut self,
        id: &str,
        status: RequestStatus,
        updated_at: i64,
    ) -> StoreResult<()> {
        let request = self
            .items
            .iter_mut()
            .find(|request| request.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        request.status = status;
        request.updated_at = updated_at;
        Ok(())
    }
}
