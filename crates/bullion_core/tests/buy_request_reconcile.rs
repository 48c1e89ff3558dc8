use bullion_core::{
    bucket_buy_requests, filter_buy_requests, normalize_buy_requests_at, requests_for_viewer,
    BuyRequest, RejectionReason, RequestFilter, RequestStatus, RequestType, StatusCounts, Viewer,
    ViewerRole,
};
use serde_json::json;

const NOW: i64 = 1_760_000_000_000;

fn request(id: &str, status: RequestStatus, request_type: RequestType) -> BuyRequest {
    BuyRequest {
        id: id.to_string(),
        item_id: Some(format!("item-{id}")),
        customer_id: Some("c1".to_string()),
        seller_id: Some("s1".to_string()),
        status,
        request_type,
        created_at: 1_000,
        updated_at: 1_000,
        captured_amount: None,
        quantity: Some(1.0),
        message: None,
        item: None,
    }
}

fn sample() -> Vec<BuyRequest> {
    vec![
        request("r1", RequestStatus::Pending, RequestType::Buy),
        request("r2", RequestStatus::Accepted, RequestType::Buy),
        request("r3", RequestStatus::Accepted, RequestType::Sell),
        request("r4", RequestStatus::Declined, RequestType::Sell),
    ]
}

#[test]
fn bucket_counts_each_status() {
    assert_eq!(
        bucket_buy_requests(&sample()),
        StatusCounts {
            accepted: 2,
            declined: 1,
            pending: 1,
        }
    );
}

#[test]
fn combined_criteria_must_both_match() {
    let filter = RequestFilter {
        status: Some(RequestStatus::Accepted),
        request_type: Some(RequestType::Buy),
    };

    let matched = filter_buy_requests(&sample(), &filter);
    let ids: Vec<&str> = matched.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["r2"]);
}

#[test]
fn absent_criteria_match_everything() {
    let all = filter_buy_requests(&sample(), &RequestFilter::default());
    assert_eq!(all, sample());

    let sells = filter_buy_requests(
        &sample(),
        &RequestFilter {
            status: None,
            request_type: Some(RequestType::Sell),
        },
    );
    let ids: Vec<&str> = sells.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["r3", "r4"]);
}

#[test]
fn empty_request_list_yields_zero_counts() {
    assert_eq!(bucket_buy_requests(&[]), StatusCounts::default());
    assert_eq!(bucket_buy_requests(&[]).total(), 0);
    assert!(filter_buy_requests(&[], &RequestFilter::default()).is_empty());
}

#[test]
fn batch_normalization_keeps_valid_records_and_reports_rejections() {
    let raw = serde_json::from_value(json!([
        {"_id": "r1", "status": "pending", "customerId": {"_id": "c1", "name": "Ada"}},
        {"_id": "r2", "status": "archived"},
        {"id": "r3", "status": "declined", "updatedAt": "2024-01-01T00:00:00Z"}
    ]))
    .unwrap();

    let batch = normalize_buy_requests_at(raw, NOW);

    let ids: Vec<&str> = batch.requests.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["r1", "r3"]);
    assert_eq!(batch.requests[0].customer_id.as_deref(), Some("c1"));
    assert_eq!(batch.requests[1].updated_at, 1_704_067_200_000);
    assert_eq!(batch.rejected.len(), 1);
    assert_eq!(batch.rejected[0].index, 1);
    assert_eq!(
        batch.rejected[0].reason,
        RejectionReason::UnknownStatus("archived".to_string())
    );
}

#[test]
fn viewer_sees_only_requests_they_take_part_in() {
    let mut requests = sample();
    requests[3].seller_id = Some("s2".to_string());
    requests[3].customer_id = Some("c2".to_string());

    let seller = Viewer::new("s1", ViewerRole::Seller);
    let customer = Viewer::new("x", ViewerRole::Customer).with_doc_id("c2");
    let admin = Viewer::new("a", ViewerRole::Admin);
    let other = Viewer::new("s1", ViewerRole::Other("auditor".to_string()));

    assert_eq!(requests_for_viewer(&requests, &seller).len(), 3);
    let customer_view = requests_for_viewer(&requests, &customer);
    assert_eq!(customer_view.len(), 1);
    assert_eq!(customer_view[0].id, "r4");
    assert_eq!(requests_for_viewer(&requests, &admin).len(), 4);
    assert!(requests_for_viewer(&requests, &other).is_empty());
}
