//! Buy/sell request use-case service.
//!
//! # Responsibility
//! - Ingest request listings, reporting records that fail normalization.
//! - Serve per-viewer summaries and filtered lists for history/dashboard
//!   views.
//! - Mirror accept/decline results locally.
//!
//! # Invariants
//! - Only `pending` requests can be decided, and only to `accepted` or
//!   `declined`.

use crate::model::buy_request::{BuyRequest, RawBuyRequest, RequestStatus};
use crate::model::viewer::Viewer;
use crate::reconcile::buy_request::{
    bucket_buy_requests, filter_buy_requests, normalize_buy_requests, requests_for_viewer,
    BuyRequestRejection, RequestFilter, StatusCounts,
};
use crate::repo::buy_request_repo::BuyRequestRepository;
use crate::repo::{parse_payload, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum BuyRequestServiceError {
    RequestNotFound(String),
    /// Decision does not move a pending request to a final state.
    InvalidTransition {
        id: String,
        from: RequestStatus,
        to: RequestStatus,
    },
    Store(StoreError),
}

impl Display for BuyRequestServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestNotFound(id) => write!(f, "buy request not found: {id}"),
            Self::InvalidTransition { id, from, to } => {
                write!(f, "buy request {id} cannot move from {from} to {to}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BuyRequestServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for BuyRequestServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::RequestNotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Outcome of one ingest call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Records now held (replace) or added (append).
    pub stored: usize,
    pub rejected: Vec<BuyRequestRejection>,
}

/// Request facade over a store implementation.
pub struct BuyRequestService<R: BuyRequestRepository> {
    repo: R,
}

impl<R: BuyRequestRepository> BuyRequestService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Replaces the collection with freshly fetched records.
    pub fn ingest(&mut self, raw: Vec<RawBuyRequest>) -> IngestReport {
        let batch = normalize_buy_requests(raw);
        let stored = batch.requests.len();
        self.repo.replace_all(batch.requests);
        info!(
            "event=buy_requests_ingest module=service status=ok mode=replace stored={} rejected={}",
            stored,
            batch.rejected.len()
        );
        IngestReport {
            stored,
            rejected: batch.rejected,
        }
    }

    pub fn ingest_json(&mut self, payload: &str) -> Result<IngestReport, BuyRequestServiceError> {
        let raw = parse_payload::<RawBuyRequest>(payload)?;
        Ok(self.ingest(raw))
    }

    /// Parses a follow-up page and appends unseen records.
    pub fn ingest_page_json(
        &mut self,
        payload: &str,
    ) -> Result<IngestReport, BuyRequestServiceError> {
        let batch = normalize_buy_requests(parse_payload::<RawBuyRequest>(payload)?);
        let stored = self.repo.append_page(batch.requests);
        info!(
            "event=buy_requests_ingest module=service status=ok mode=append added={} rejected={}",
            stored,
            batch.rejected.len()
        );
        Ok(IngestReport {
            stored,
            rejected: batch.rejected,
        })
    }

    /// Status tallies over the requests the viewer takes part in.
    pub fn summary_for(&self, viewer: &Viewer) -> StatusCounts {
        bucket_buy_requests(&requests_for_viewer(self.repo.all(), viewer))
    }

    /// Requests the viewer takes part in, narrowed by `filter`.
    pub fn list_for(&self, viewer: &Viewer, filter: &RequestFilter) -> Vec<BuyRequest> {
        filter_buy_requests(&requests_for_viewer(self.repo.all(), viewer), filter)
    }

    /// Mirrors a seller's accept/decline once the backend confirmed it.
    ///
    /// # Errors
    /// - `RequestNotFound` when `id` is not held.
    /// - `InvalidTransition` when the request is no longer pending or the
    ///   decision is `pending`.
    pub fn apply_decision(
        &mut self,
        id: &str,
        decision: RequestStatus,
        updated_at: i64,
    ) -> Result<(), BuyRequestServiceError> {
        let current = self
            .repo
            .get(id)
            .map(|request| request.status)
            .ok_or_else(|| BuyRequestServiceError::RequestNotFound(id.to_string()))?;

        if current != RequestStatus::Pending || decision == RequestStatus::Pending {
            warn!(
                "event=buy_request_decision module=service status=error id={} from={} to={}",
                id, current, decision
            );
            return Err(BuyRequestServiceError::InvalidTransition {
                id: id.to_string(),
                from: current,
                to: decision,
            });
        }

        self.repo.set_status(id, decision, updated_at)?;
        Ok(())
    }
}
