//! Authenticated viewer descriptor.

use serde::{Deserialize, Serialize};

/// Account role as reported by the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ViewerRole {
    Admin,
    Seller,
    Customer,
    Other(String),
}

impl ViewerRole {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Seller => "seller",
            Self::Customer => "customer",
            Self::Other(raw) => raw.as_str(),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl From<&str> for ViewerRole {
    fn from(value: &str) -> Self {
        match value {
            "admin" => Self::Admin,
            "seller" => Self::Seller,
            "customer" => Self::Customer,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ViewerRole {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<ViewerRole> for String {
    fn from(value: ViewerRole) -> Self {
        match value {
            ViewerRole::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// The user a list is being reconciled for.
///
/// Sessions carry the account id as `id` and, for some login paths, the
/// document id as `_id`; either may identify the viewer as a recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub id: String,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    pub role: ViewerRole,
}

impl Viewer {
    pub fn new(id: impl Into<String>, role: ViewerRole) -> Self {
        Self {
            id: id.into(),
            doc_id: None,
            role,
        }
    }

    /// Sets the secondary `_id` identity.
    pub fn with_doc_id(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }

    /// Returns whether `candidate` names this viewer under either identity.
    pub fn is_identified_by(&self, candidate: &str) -> bool {
        self.id == candidate || self.doc_id.as_deref() == Some(candidate)
    }
}
