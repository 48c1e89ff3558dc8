//! Notification domain model.
//!
//! # Responsibility
//! - Describe the raw notification record as the backend sends it.
//! - Define the canonical local record every view consumes.
//!
//! # Invariants
//! - `RawNotification` never leaves the reconcile boundary.
//! - A `Notification` always has one string `id` and one epoch-ms `timestamp`.
//! - `Notification` serializes to a shape that reads back as a
//!   `RawNotification` and normalizes to itself.

use crate::model::value::lenient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Notification category vocabulary used by the backend.
///
/// Unrecognized values are kept verbatim in `Unknown` and rendered with the
/// default display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationType {
    SellerSignup,
    CustomerSignup,
    UserDeletion,
    Transaction,
    System,
    Alert,
    Referral,
    ContactRequest,
    RoleChange,
    PaymentSuccess,
    BuyRequest,
    BuyRequestAccepted,
    BuyRequestDeclined,
    Unknown(String),
}

/// Display metadata for one notification category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDisplay {
    /// Short human label.
    pub label: &'static str,
    /// Icon key understood by the UI layer.
    pub icon: &'static str,
}

const DEFAULT_DISPLAY: TypeDisplay = TypeDisplay {
    label: "Notification",
    icon: "notifications",
};

impl NotificationType {
    /// Returns the wire name of this category.
    pub fn as_str(&self) -> &str {
        match self {
            Self::SellerSignup => "seller_signup",
            Self::CustomerSignup => "customer_signup",
            Self::UserDeletion => "user_deletion",
            Self::Transaction => "transaction",
            Self::System => "system",
            Self::Alert => "alert",
            Self::Referral => "referral",
            Self::ContactRequest => "contact_request",
            Self::RoleChange => "role_change",
            Self::PaymentSuccess => "payment_success",
            Self::BuyRequest => "buy_request",
            Self::BuyRequestAccepted => "buy_request_accepted",
            Self::BuyRequestDeclined => "buy_request_declined",
            Self::Unknown(raw) => raw.as_str(),
        }
    }

    /// Broadcast categories are visible to every viewer.
    pub fn is_broadcast(&self) -> bool {
        matches!(self, Self::System | Self::Alert)
    }

    /// Returns label and icon for rendering this category.
    pub fn display(&self) -> TypeDisplay {
        let (label, icon) = match self {
            Self::SellerSignup => ("New seller", "storefront"),
            Self::CustomerSignup => ("New customer", "person-add"),
            Self::UserDeletion => ("Account removed", "person-remove"),
            Self::Transaction => ("Transaction", "swap-horizontal"),
            Self::System => ("System", "settings"),
            Self::Alert => ("Alert", "warning"),
            Self::Referral => ("Referral", "gift"),
            Self::ContactRequest => ("Contact request", "call"),
            Self::RoleChange => ("Role changed", "shield-checkmark"),
            Self::PaymentSuccess => ("Payment received", "card"),
            Self::BuyRequest => ("Buy request", "cart"),
            Self::BuyRequestAccepted => ("Request accepted", "checkmark-circle"),
            Self::BuyRequestDeclined => ("Request declined", "close-circle"),
            Self::Unknown(_) => return DEFAULT_DISPLAY,
        };
        TypeDisplay { label, icon }
    }
}

impl Default for NotificationType {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl From<&str> for NotificationType {
    fn from(value: &str) -> Self {
        match value {
            "seller_signup" => Self::SellerSignup,
            "customer_signup" => Self::CustomerSignup,
            "user_deletion" => Self::UserDeletion,
            "transaction" => Self::Transaction,
            "system" => Self::System,
            "alert" => Self::Alert,
            "referral" => Self::Referral,
            "contact_request" => Self::ContactRequest,
            "role_change" => Self::RoleChange,
            "payment_success" => Self::PaymentSuccess,
            "buy_request" => Self::BuyRequest,
            "buy_request_accepted" => Self::BuyRequestAccepted,
            "buy_request_declined" => Self::BuyRequestDeclined,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for NotificationType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<NotificationType> for String {
    fn from(value: NotificationType) -> Self {
        match value {
            NotificationType::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Notification record as received from the listing endpoint.
///
/// Identity and time fields arrive in two alternative spellings; both are
/// kept as raw JSON so normalization can decide. Display and flag fields are
/// raw JSON too, so a mistyped field degrades to its default instead of
/// failing the listing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNotification {
    /// Document id, serialized as `_id`.
    #[serde(rename = "_id", default)]
    pub doc_id: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<NotificationType>,
    /// Absent or `null` means the notification is global.
    #[serde(default)]
    pub recipient_id: Option<Value>,
    /// Read with JavaScript truthiness.
    #[serde(default)]
    pub read: Option<Value>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub timestamp: Option<Value>,
    /// ISO-8601 string or epoch milliseconds.
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Canonical local notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    /// String form of the recipient; `None` for global notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    pub read: bool,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Notification {
    /// Returns whether this notification targets no specific recipient.
    pub fn is_global(&self) -> bool {
        self.recipient_id.is_none()
    }

    pub fn mark_read(&mut self) {
        self.read = true;
    }
}
