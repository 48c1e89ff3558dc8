//! Session stores for collections mirrored from the backend.
//!
//! # Responsibility
//! - Own the single authoritative in-memory copy of each collection.
//! - Replace collections wholesale on fetch; append on pagination.
//! - Expose reads through accessors only.
//!
//! # Invariants
//! - Stores hold canonical records only; raw payloads are parsed and
//!   normalized before they reach a store.
//! - Mutations of unknown ids report `StoreError::NotFound`.
//! - One malformed record never fails a whole listing.

use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod buy_request_repo;
pub mod notification_repo;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error for payload ingestion and keyed mutations.
#[derive(Debug)]
pub enum StoreError {
    /// Backend payload is not a JSON array.
    InvalidPayload(serde_json::Error),
    NotFound(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPayload(err) => write!(f, "invalid backend payload: {err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPayload(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidPayload(value)
    }
}

/// Parses a listing payload (a JSON array) into raw records.
///
/// Only a body that is not an array fails. Records that do not deserialize
/// as `T` (non-objects, in practice) are dropped with a warning.
pub fn parse_payload<T: DeserializeOwned>(payload: &str) -> StoreResult<Vec<T>> {
    let records = serde_json::from_str::<Vec<Value>>(payload)?;
    let total = records.len();
    let parsed: Vec<T> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(
                    "event=payload_record_skipped module=repo status=error index={} error={}",
                    index, err
                );
                None
            }
        })
        .collect();
    if parsed.len() < total {
        warn!(
            "event=payload_parse module=repo status=partial total={} kept={}",
            total,
            parsed.len()
        );
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::{parse_payload, StoreError};
    use crate::model::buy_request::RawBuyRequest;
    use crate::model::notification::RawNotification;
    use serde_json::json;

    #[test]
    fn parse_payload_rejects_non_array_bodies() {
        let err = parse_payload::<RawNotification>(r#"{"notifications": []}"#).unwrap_err();
        assert!(matches!(err, StoreError::InvalidPayload(_)));
        assert!(err.to_string().starts_with("invalid backend payload"));
    }

    #[test]
    fn parse_payload_reads_empty_array() {
        let parsed = parse_payload::<RawNotification>("[]").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn parse_payload_keeps_good_records_around_a_bad_one() {
        let parsed = parse_payload::<RawNotification>(
            r#"[{"_id":"a","title":"ok"},{"_id":"b","title":42},[{"_id":"c","read":0}],7,{"_id":"d"}]"#,
        )
        .unwrap();

        let ids: Vec<_> = parsed.iter().map(|raw| raw.doc_id.clone()).collect();
        assert_eq!(ids, vec![Some(json!("a")), Some(json!("b")), Some(json!("d"))]);
        assert_eq!(parsed[1].title, Some(json!(42)));
    }

    #[test]
    fn parse_payload_tolerates_mistyped_request_scalars() {
        let parsed = parse_payload::<RawBuyRequest>(
            r#"[{"_id":"r1","status":"pending","capturedAmount":"12.5","message":false}]"#,
        )
        .unwrap();

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].captured_amount, Some(json!("12.5")));
        assert_eq!(parsed[0].message, None);
    }
}
