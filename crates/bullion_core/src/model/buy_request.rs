//! Buy/sell request domain model.
//!
//! # Responsibility
//! - Describe request records as the listing endpoint sends them, with
//!   references either bare ids or populated documents.
//! - Define the canonical local request record.
//!
//! # Invariants
//! - `status` is always one of `pending|accepted|declined`.
//! - Reference fields of a `BuyRequest` are plain string ids.

use crate::model::value::lenient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Request lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Waiting for the seller's decision.
    Pending,
    Accepted,
    Declined,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    /// Parses a wire status. Unknown values return `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }
}

impl Display for RequestStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of the trade from the customer's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    #[default]
    Buy,
    Sell,
}

impl RequestType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "buy" => Some(Self::Buy),
            "sell" => Some(Self::Sell),
            _ => None,
        }
    }
}

impl Display for RequestType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product fields captured when the item reference arrives populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Metal kind, e.g. `gold` or `silver`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metal: Option<String>,
    /// Weight in grams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// Request record as received from the listing endpoint.
///
/// Scalars stay raw JSON; normalization coerces or rejects them per record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBuyRequest {
    #[serde(rename = "_id", default)]
    pub doc_id: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
    /// Bare id or populated product document.
    #[serde(default)]
    pub item_id: Option<Value>,
    #[serde(default)]
    pub customer_id: Option<Value>,
    #[serde(default)]
    pub seller_id: Option<Value>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub request_type: Option<Value>,
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub updated_at: Option<Value>,
    /// Number or numeric string.
    #[serde(default)]
    pub captured_amount: Option<Value>,
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
}

/// Canonical local buy/sell request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyRequest {
    pub id: String,
    pub item_id: Option<String>,
    pub customer_id: Option<String>,
    pub seller_id: Option<String>,
    pub status: RequestStatus,
    pub request_type: RequestType,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds; equals `created_at` until the first decision.
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemSnapshot>,
}

impl BuyRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}
