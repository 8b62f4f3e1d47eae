//! Tests for list query and page envelope types

use super::*;
use crate::error::Error;
use pretty_assertions::assert_eq;
use reqwest::Method;
use serde_json::json;

#[test]
fn test_list_query_defaults() {
    let query = ListQuery::new();
    assert_eq!(query.method, Method::GET);
    assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);
    assert!(query.paginated);
    assert!(query.max_pages.is_none());
}

#[test]
fn test_list_query_params() {
    let query = ListQuery::new()
        .ordering("-created_at")
        .ordering("id")
        .sideload("documents")
        .sideload("content")
        .content_schema_id("item_code")
        .filter("status", "exported")
        .page_size(50);

    let params = query.query_params();
    assert_eq!(params["page_size"], "50");
    assert_eq!(params["ordering"], "-created_at,id");
    assert_eq!(params["sideload"], "documents,content");
    assert_eq!(params["content.schema_id"], "item_code");
    assert_eq!(params["status"], "exported");
}

#[test]
fn test_list_query_json_body_switches_to_post() {
    let query = ListQuery::new().json(json!({"query": {"field": "status"}}));
    assert_eq!(query.method, Method::POST);
    assert!(query.json.is_some());
}

#[test]
fn test_unpaginated_query_omits_page_size() {
    let params = ListQuery::new().unpaginated().query_params();
    assert!(!params.contains_key("page_size"));
}

#[test]
fn test_page_envelope_from_value() {
    let envelope = PageEnvelope::from_value(json!({
        "results": [{"id": 1}, {"id": 2}],
        "pagination": {"total_pages": 7, "total": 650},
    }))
    .unwrap();

    assert_eq!(envelope.total_pages, 7);
    assert_eq!(envelope.results, vec![json!({"id": 1}), json!({"id": 2})]);
}

#[test]
fn test_page_envelope_missing_total_pages() {
    let err = PageEnvelope::from_value(json!({
        "results": [],
        "pagination": {},
    }))
    .unwrap_err();
    assert!(matches!(err, Error::Envelope { .. }));
    assert!(err.to_string().contains("total_pages"));
}

#[test]
fn test_page_envelope_missing_results() {
    let err = PageEnvelope::from_value(json!({
        "pagination": {"total_pages": 1},
    }))
    .unwrap_err();
    assert!(matches!(err, Error::Envelope { .. }));
}

#[test]
fn test_page_envelope_results_not_an_array() {
    let err = PageEnvelope::from_value(json!({
        "results": "oops",
        "pagination": {"total_pages": 1},
    }))
    .unwrap_err();
    assert!(matches!(err, Error::Envelope { .. }));
}
