//! Buy/sell request reconciliation.
//!
//! # Responsibility
//! - Normalize raw request records, flattening populated references.
//! - Bucket requests by status and filter them by status/type criteria.
//!
//! # Invariants
//! - Records with an unknown status are rejected, never coerced.
//! - Filters keep relative order.

use crate::model::buy_request::{
    BuyRequest, ItemSnapshot, RawBuyRequest, RequestStatus, RequestType,
};
use crate::model::value::{epoch_millis, extract_id, number_value};
use crate::model::viewer::{Viewer, ViewerRole};
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why one raw request could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// Neither `_id` nor `id` carried a usable identifier.
    MissingId,
    UnknownStatus(String),
    UnknownRequestType(String),
}

impl Display for RejectionReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingId => write!(f, "request has no `_id` or `id`"),
            Self::UnknownStatus(value) => {
                write!(f, "unknown status `{value}`; expected pending|accepted|declined")
            }
            Self::UnknownRequestType(value) => {
                write!(f, "unknown request type `{value}`; expected buy|sell")
            }
        }
    }
}

impl Error for RejectionReason {}

/// One rejected record with its position in the input list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyRequestRejection {
    pub index: usize,
    pub reason: RejectionReason,
}

impl Display for BuyRequestRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "request #{}: {}", self.index, self.reason)
    }
}

impl Error for BuyRequestRejection {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.reason)
    }
}

/// Normalization result for a raw request list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuyRequestBatch {
    /// Normalized records in input order.
    pub requests: Vec<BuyRequest>,
    pub rejected: Vec<BuyRequestRejection>,
}

/// Per-status tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub accepted: usize,
    pub declined: usize,
    pub pending: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.accepted + self.declined + self.pending
    }
}

/// Optional status/type criteria. An absent criterion matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub request_type: Option<RequestType>,
}

impl RequestFilter {
    pub fn matches(&self, request: &BuyRequest) -> bool {
        self.status.map_or(true, |status| request.status == status)
            && self
                .request_type
                .map_or(true, |request_type| request.request_type == request_type)
    }
}

pub fn normalize_buy_requests(raw: Vec<RawBuyRequest>) -> BuyRequestBatch {
    normalize_buy_requests_at(raw, chrono::Utc::now().timestamp_millis())
}

/// Normalizes a raw list; `now_ms` stands in for a missing `createdAt`.
pub fn normalize_buy_requests_at(raw: Vec<RawBuyRequest>, now_ms: i64) -> BuyRequestBatch {
    let mut batch = BuyRequestBatch::default();
    for (index, record) in raw.into_iter().enumerate() {
        match normalize_buy_request_at(record, now_ms) {
            Ok(request) => batch.requests.push(request),
            Err(reason) => {
                warn!(
                    "event=buy_request_rejected module=reconcile status=error index={} reason={}",
                    index, reason
                );
                batch.rejected.push(BuyRequestRejection { index, reason });
            }
        }
    }
    debug!(
        "event=buy_requests_normalize module=reconcile status=ok accepted={} rejected={}",
        batch.requests.len(),
        batch.rejected.len()
    );
    batch
}

/// Normalizes one raw request.
///
/// # Contract
/// - `id`: `_id` in string form, else `id`; neither -> `MissingId`.
/// - Reference fields accept bare ids or populated documents.
/// - `status`/`requestType` must be known strings; `null` status is
///   unknown, `null` type is `buy`.
/// - `capturedAmount`/`quantity` accept numbers or numeric strings; anything
///   else reads as absent.
/// - `requestType` defaults to `buy`; `createdAt` defaults to `now_ms`;
///   `updatedAt` defaults to `createdAt`.
pub fn normalize_buy_request_at(
    raw: RawBuyRequest,
    now_ms: i64,
) -> Result<BuyRequest, RejectionReason> {
    let id = raw
        .doc_id
        .as_ref()
        .and_then(extract_id)
        .or_else(|| raw.id.as_ref().and_then(extract_id))
        .filter(|id| !id.is_empty())
        .ok_or(RejectionReason::MissingId)?;

    let status = match raw.status.as_ref() {
        Some(Value::String(text)) => RequestStatus::parse(text.trim())
            .ok_or_else(|| RejectionReason::UnknownStatus(text.clone()))?,
        Some(other) => return Err(RejectionReason::UnknownStatus(other.to_string())),
        None => return Err(RejectionReason::UnknownStatus(String::new())),
    };

    let request_type = match raw.request_type.as_ref() {
        None | Some(Value::Null) => RequestType::default(),
        Some(Value::String(text)) => RequestType::parse(text.trim())
            .ok_or_else(|| RejectionReason::UnknownRequestType(text.clone()))?,
        Some(other) => return Err(RejectionReason::UnknownRequestType(other.to_string())),
    };

    let created_at = raw
        .created_at
        .as_ref()
        .and_then(epoch_millis)
        .unwrap_or(now_ms);
    let updated_at = raw
        .updated_at
        .as_ref()
        .and_then(epoch_millis)
        .unwrap_or(created_at);

    Ok(BuyRequest {
        id,
        item: raw.item_id.as_ref().and_then(item_snapshot),
        item_id: raw.item_id.as_ref().and_then(extract_id),
        customer_id: raw.customer_id.as_ref().and_then(extract_id),
        seller_id: raw.seller_id.as_ref().and_then(extract_id),
        status,
        request_type,
        created_at,
        updated_at,
        captured_amount: raw.captured_amount.as_ref().and_then(number_value),
        quantity: raw.quantity.as_ref().and_then(number_value),
        message: raw.message,
    })
}

fn item_snapshot(value: &Value) -> Option<ItemSnapshot> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

/// Tallies requests by status.
pub fn bucket_buy_requests(requests: &[BuyRequest]) -> StatusCounts {
    requests
        .iter()
        .fold(StatusCounts::default(), |mut counts, request| {
            match request.status {
                RequestStatus::Accepted => counts.accepted += 1,
                RequestStatus::Declined => counts.declined += 1,
                RequestStatus::Pending => counts.pending += 1,
            }
            counts
        })
}

/// Returns the subsequence matching every present criterion.
pub fn filter_buy_requests(requests: &[BuyRequest], filter: &RequestFilter) -> Vec<BuyRequest> {
    requests
        .iter()
        .filter(|request| filter.matches(request))
        .cloned()
        .collect()
}

/// Returns the requests a viewer takes part in.
///
/// Admins see every request, sellers the ones addressed to them, customers
/// the ones they placed. Other roles see none.
pub fn requests_for_viewer(requests: &[BuyRequest], viewer: &Viewer) -> Vec<BuyRequest> {
    let party = |id: &Option<String>| id.as_deref().is_some_and(|id| viewer.is_identified_by(id));
    requests
        .iter()
        .filter(|request| match &viewer.role {
            ViewerRole::Admin => true,
            ViewerRole::Seller => party(&request.seller_id),
            ViewerRole::Customer => party(&request.customer_id),
            ViewerRole::Other(_) => false,
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_buy_request_at, RejectionReason};
    use crate::model::buy_request::{RawBuyRequest, RequestStatus, RequestType};
    use serde_json::json;

    const NOW: i64 = 1_750_000_000_000;

    fn raw(value: serde_json::Value) -> RawBuyRequest {
        serde_json::from_value(value).expect("raw fixture should parse")
    }

    #[test]
    fn populated_references_are_flattened_and_item_is_captured() {
        let request = normalize_buy_request_at(
            raw(json!({
                "_id": "r1",
                "itemId": {"_id": "i1", "name": "Britannia 1oz", "metal": "gold", "weight": 31.1},
                "customerId": {"id": "c1", "email": "c1@example.com"},
                "sellerId": "s1",
                "status": "pending",
                "requestType": "sell",
                "createdAt": 1000
            })),
            NOW,
        )
        .unwrap();

        assert_eq!(request.id, "r1");
        assert_eq!(request.item_id.as_deref(), Some("i1"));
        assert_eq!(request.customer_id.as_deref(), Some("c1"));
        assert_eq!(request.seller_id.as_deref(), Some("s1"));
        assert_eq!(request.request_type, RequestType::Sell);
        assert_eq!(request.created_at, 1000);
        assert_eq!(request.updated_at, 1000);
        let item = request.item.expect("populated item should be captured");
        assert_eq!(item.metal.as_deref(), Some("gold"));
        assert_eq!(item.weight, Some(31.1));
    }

    #[test]
    fn bare_item_reference_has_no_snapshot() {
        let request =
            normalize_buy_request_at(raw(json!({"id": "r2", "itemId": "i2", "status": "accepted"})), NOW)
                .unwrap();

        assert_eq!(request.item_id.as_deref(), Some("i2"));
        assert!(request.item.is_none());
        assert_eq!(request.status, RequestStatus::Accepted);
        assert_eq!(request.request_type, RequestType::Buy);
        assert_eq!(request.created_at, NOW);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = normalize_buy_request_at(raw(json!({"id": "r3", "status": "cancelled"})), NOW)
            .unwrap_err();
        assert_eq!(err, RejectionReason::UnknownStatus("cancelled".to_string()));

        let err = normalize_buy_request_at(raw(json!({"id": "r4"})), NOW).unwrap_err();
        assert_eq!(err, RejectionReason::UnknownStatus(String::new()));
    }

    #[test]
    fn mistyped_scalars_are_coerced_or_rejected_per_record() {
        let request = normalize_buy_request_at(
            raw(json!({
                "id": "r6",
                "status": "pending",
                "capturedAmount": "1999.99",
                "quantity": {"value": 2},
                "message": 7
            })),
            NOW,
        )
        .unwrap();
        assert_eq!(request.captured_amount, Some(1999.99));
        assert_eq!(request.quantity, None);
        assert_eq!(request.message, None);

        let err = normalize_buy_request_at(raw(json!({"id": "r7", "status": 2})), NOW)
            .unwrap_err();
        assert_eq!(err, RejectionReason::UnknownStatus("2".to_string()));
    }

    #[test]
    fn missing_id_and_bad_type_are_rejected() {
        let err = normalize_buy_request_at(raw(json!({"status": "pending"})), NOW).unwrap_err();
        assert_eq!(err, RejectionReason::MissingId);

        let err = normalize_buy_request_at(
            raw(json!({"id": "r5", "status": "pending", "requestType": "swap"})),
            NOW,
        )
        .unwrap_err();
        assert_eq!(err, RejectionReason::UnknownRequestType("swap".to_string()));
    }
}
