//! Notification reconciliation pipeline.
//!
//! # Responsibility
//! - Normalize raw backend notifications into `Notification`.
//! - Select the notifications a viewer may see.
//! - Derive unread counts.
//!
//! # Invariants
//! - Normalization is total and keeps input length and order.
//! - Filtering is pure and keeps relative order.
//! - Admin viewers see everything; the legacy admin-only ids are hidden from
//!   everyone else before any recipient check runs.

use crate::model::notification::{Notification, RawNotification};
use crate::model::value::{display_text, epoch_millis, extract_id, is_truthy};
use crate::model::viewer::Viewer;
use log::debug;
use serde_json::Value;
use std::collections::HashSet;

/// Legacy notification id reserved for admins.
///
/// Hard-coded by older backend seeds rather than derived from
/// `recipientId`/`type`. Kept for compatibility; retire it through
/// `CoreConfig::admin_only_ids` once the seed data is gone.
pub const LEGACY_ADMIN_ONLY_ID: &str = "1";

/// Normalizes a raw list, using the current time for records without any
/// time field.
pub fn normalize(raw: Vec<RawNotification>) -> Vec<Notification> {
    normalize_at(raw, chrono::Utc::now().timestamp_millis())
}

/// Normalizes a raw list with an explicit clock value (epoch ms).
pub fn normalize_at(raw: Vec<RawNotification>, now_ms: i64) -> Vec<Notification> {
    let total = raw.len();
    let normalized: Vec<Notification> = raw
        .into_iter()
        .map(|record| normalize_one_at(record, now_ms))
        .collect();
    let missing_ids = normalized.iter().filter(|n| n.id.is_empty()).count();
    debug!(
        "event=notifications_normalize module=reconcile status=ok total={} missing_ids={}",
        total, missing_ids
    );
    normalized
}

/// Normalizes one record.
///
/// # Contract
/// - `id`: `_id` in string form, else `id`, else empty string.
/// - `timestamp`: `timestamp`, else `createdAt`, else `now_ms`.
/// - `recipientId`: absent/`null` is global; any other value stays targeted,
///   falling back to its JSON text when no id can be extracted.
/// - Missing or structured display fields become empty; `read` follows
///   JavaScript truthiness and defaults to `false`.
pub fn normalize_one_at(raw: RawNotification, now_ms: i64) -> Notification {
    let id = raw
        .doc_id
        .as_ref()
        .and_then(extract_id)
        .or_else(|| raw.id.as_ref().and_then(extract_id))
        .unwrap_or_default();
    let timestamp = raw
        .timestamp
        .as_ref()
        .and_then(epoch_millis)
        .or_else(|| raw.created_at.as_ref().and_then(epoch_millis))
        .unwrap_or(now_ms);

    Notification {
        id,
        title: raw.title.as_ref().and_then(display_text).unwrap_or_default(),
        message: raw.message.as_ref().and_then(display_text).unwrap_or_default(),
        kind: raw.kind.unwrap_or_default(),
        recipient_id: raw.recipient_id.as_ref().and_then(recipient_key),
        read: raw.read.as_ref().is_some_and(is_truthy),
        timestamp,
        data: raw.data,
    }
}

fn recipient_key(value: &Value) -> Option<String> {
    if value.is_null() {
        return None;
    }
    Some(extract_id(value).unwrap_or_else(|| value.to_string()))
}

/// Returns the notifications visible to `viewer`, using the legacy
/// admin-only id.
pub fn filter_for_viewer(list: &[Notification], viewer: &Viewer) -> Vec<Notification> {
    filter_for_viewer_with(list, viewer, &[LEGACY_ADMIN_ONLY_ID])
}

/// Returns the notifications visible to `viewer` with a caller-chosen
/// admin-only id list.
pub fn filter_for_viewer_with<S: AsRef<str>>(
    list: &[Notification],
    viewer: &Viewer,
    admin_only_ids: &[S],
) -> Vec<Notification> {
    let visible: Vec<Notification> = list
        .iter()
        .filter(|notification| is_visible_to(notification, viewer, admin_only_ids))
        .cloned()
        .collect();
    debug!(
        "event=notifications_filter module=reconcile status=ok role={} input={} visible={}",
        viewer.role.as_str(),
        list.len(),
        visible.len()
    );
    visible
}

/// Visibility predicate; first matching rule wins.
///
/// 1. Admin viewers see every record.
/// 2. Records whose id is admin-only are hidden.
/// 3. Global records, records addressed to the viewer and broadcast types
///    (`system`, `alert`) are shown.
/// 4. Everything else is hidden.
pub fn is_visible_to<S: AsRef<str>>(
    notification: &Notification,
    viewer: &Viewer,
    admin_only_ids: &[S],
) -> bool {
    if viewer.role.is_admin() {
        return true;
    }
    if admin_only_ids
        .iter()
        .any(|reserved| reserved.as_ref() == notification.id)
    {
        return false;
    }

    match notification.recipient_id.as_deref() {
        None => true,
        Some(recipient) if viewer.is_identified_by(recipient) => true,
        Some(_) => notification.kind.is_broadcast(),
    }
}

/// Counts unread records.
pub fn unread_count(list: &[Notification]) -> usize {
    list.iter().filter(|notification| !notification.read).count()
}

/// Drops later records whose id was already seen, keeping order.
///
/// Used when consecutive pages overlap. Records with an empty id are never
/// treated as duplicates of each other.
pub fn dedupe_by_id(list: Vec<Notification>) -> Vec<Notification> {
    let mut seen = HashSet::new();
    list.into_iter()
        .filter(|notification| notification.id.is_empty() || seen.insert(notification.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{dedupe_by_id, is_visible_to, normalize_one_at, LEGACY_ADMIN_ONLY_ID};
    use crate::model::notification::{NotificationType, RawNotification};
    use crate::model::viewer::{Viewer, ViewerRole};
    use serde_json::json;

    const NOW: i64 = 1_750_000_000_000;

    fn raw(value: serde_json::Value) -> RawNotification {
        serde_json::from_value(value).expect("raw fixture should parse")
    }

    #[test]
    fn doc_id_takes_precedence_over_id() {
        let normalized = normalize_one_at(raw(json!({"_id": "a", "id": "b"})), NOW);
        assert_eq!(normalized.id, "a");
    }

    #[test]
    fn numeric_doc_id_is_stringified() {
        let normalized = normalize_one_at(raw(json!({"_id": 17})), NOW);
        assert_eq!(normalized.id, "17");
    }

    #[test]
    fn missing_fields_get_documented_defaults() {
        let normalized = normalize_one_at(RawNotification::default(), NOW);

        assert_eq!(normalized.id, "");
        assert_eq!(normalized.timestamp, NOW);
        assert_eq!(normalized.title, "");
        assert!(!normalized.read);
        assert_eq!(normalized.kind, NotificationType::Unknown(String::new()));
        assert!(normalized.is_global());
    }

    #[test]
    fn unparseable_created_at_falls_back_to_clock() {
        let normalized = normalize_one_at(raw(json!({"id": "x", "createdAt": "soon"})), NOW);
        assert_eq!(normalized.timestamp, NOW);
    }

    #[test]
    fn populated_recipient_is_flattened() {
        let normalized = normalize_one_at(
            raw(json!({"id": "x", "recipientId": {"_id": "u42", "name": "Ada"}})),
            NOW,
        );
        assert_eq!(normalized.recipient_id.as_deref(), Some("u42"));
    }

    #[test]
    fn unextractable_recipient_stays_targeted() {
        let stranger = Viewer::new("zz", ViewerRole::Customer);

        for recipient in [json!(true), json!(["u1"]), json!({"name": "Ada"})] {
            let normalized =
                normalize_one_at(raw(json!({"_id": "d", "recipientId": recipient})), NOW);
            assert!(!normalized.is_global());
            assert!(!is_visible_to(&normalized, &stranger, &[LEGACY_ADMIN_ONLY_ID]));
        }
    }

    #[test]
    fn mistyped_display_fields_are_coerced() {
        let normalized = normalize_one_at(
            raw(json!({"_id": "b", "title": 42, "message": {"en": "hi"}, "read": 0})),
            NOW,
        );

        assert_eq!(normalized.title, "42");
        assert_eq!(normalized.message, "");
        assert!(!normalized.read);

        let read = normalize_one_at(raw(json!({"_id": "c", "read": 1})), NOW);
        assert!(read.read);
    }

    #[test]
    fn broadcast_types_pass_recipient_mismatch() {
        let viewer = Viewer::new("u1", ViewerRole::Seller);
        let alert = normalize_one_at(
            raw(json!({"id": "n5", "recipientId": "u2", "type": "alert"})),
            NOW,
        );
        let transaction = normalize_one_at(
            raw(json!({"id": "n6", "recipientId": "u2", "type": "transaction"})),
            NOW,
        );

        assert!(is_visible_to(&alert, &viewer, &[LEGACY_ADMIN_ONLY_ID]));
        assert!(!is_visible_to(&transaction, &viewer, &[LEGACY_ADMIN_ONLY_ID]));
    }

    #[test]
    fn empty_admin_only_list_disables_sentinel() {
        let viewer = Viewer::new("u1", ViewerRole::Customer);
        let legacy = normalize_one_at(raw(json!({"id": "1"})), NOW);
        let none: [&str; 0] = [];

        assert!(!is_visible_to(&legacy, &viewer, &[LEGACY_ADMIN_ONLY_ID]));
        assert!(is_visible_to(&legacy, &viewer, &none));
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let list = vec![
            normalize_one_at(raw(json!({"id": "a", "title": "first"})), NOW),
            normalize_one_at(raw(json!({"id": "b"})), NOW),
            normalize_one_at(raw(json!({"id": "a", "title": "second"})), NOW),
            normalize_one_at(raw(json!({})), NOW),
            normalize_one_at(raw(json!({})), NOW),
        ];

        let deduped = dedupe_by_id(list);
        let ids: Vec<&str> = deduped.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "", ""]);
        assert_eq!(deduped[0].title, "first");
    }
}
