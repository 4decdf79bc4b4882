#![allow(clippy::unwrap_used)]
// Integration tests for the resource operators using wiremock.

use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{any, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clearpass_api::{Client, EndpointExtras, EndpointStatus, EndpointUpdate, Error, Item, ListQuery};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Client) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let client = Client::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn page(items: &Value) -> Value {
    json!({
        "_links": { "self": { "href": "https://cppm/api/session" } },
        "_embedded": { "items": items }
    })
}

fn session(id: u32) -> Value {
    json!({
        "id": id.to_string(),
        "mac_address": format!("00112233445{}", id % 10),
        "nasipaddress": "10.0.0.1",
        "state": "active"
    })
}

fn item(value: Value) -> Item {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

// ── Pagination tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_session_list_stops_on_empty_page() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/session"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "2"))
        .and(query_param("sort", "-id"))
        .and(query_param("filter", r#"{"acctstoptime":{"$exists":false}}"#))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(&json!([session(9), session(8)]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/session"))
        .and(query_param("offset", "2"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let query = ListQuery::active_sessions()
        .with_limit(2)
        .with_max_requests(10);
    let sessions = client.sessions().get_list(&query).await.unwrap().unwrap();

    assert_eq!(sessions, vec![item(session(9)), item(session(8))]);
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_list_stops_on_short_page() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/endpoint"))
        .and(query_param("offset", "0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(&json!([session(1), session(2)]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let query = ListQuery::endpoints().with_limit(3);
    let endpoints = client.endpoints().get_list(&query).await.unwrap().unwrap();

    assert_eq!(endpoints.len(), 2);
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_list_respects_max_requests() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/endpoint"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(&json!([session(1), session(2)]))),
        )
        .expect(3)
        .mount(&server)
        .await;

    let query = ListQuery::endpoints().with_limit(2).with_max_requests(3);
    let endpoints = client.endpoints().get_list(&query).await.unwrap().unwrap();

    assert_eq!(endpoints.len(), 6);

    let offsets: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|req| {
            req.url
                .query_pairs()
                .find(|(k, _)| k == "offset")
                .map(|(_, v)| v.into_owned())
                .unwrap()
        })
        .collect();
    assert_eq!(offsets, vec!["0", "2", "4"]);
}

#[tokio::test]
async fn test_list_discards_items_on_http_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/session"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&json!([session(1)]))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/session"))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let query = ListQuery::active_sessions().with_limit(1);
    let result = client.sessions().get_list(&query).await.unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_list_discards_items_on_malformed_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/endpoint"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&json!([session(1)]))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/endpoint"))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "_embedded": {} })))
        .mount(&server)
        .await;

    let query = ListQuery::endpoints().with_limit(1);
    let result = client.endpoints().get_list(&query).await.unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_empty_first_page_is_empty_list_not_none() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let result = client
        .sessions()
        .get_list(&ListQuery::active_sessions())
        .await
        .unwrap();

    assert_eq!(result, Some(Vec::new()));
}

#[tokio::test]
async fn test_invalid_list_arguments_send_nothing() {
    let (server, client) = setup().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&json!([]))))
        .expect(0)
        .mount(&server)
        .await;

    for limit in [0, 1001, 5000] {
        let query = ListQuery::active_sessions().with_limit(limit);
        let result = client.sessions().get_list(&query).await;
        assert!(matches!(result, Err(Error::InvalidArgument { .. })), "limit {limit}");
    }

    let query = ListQuery::endpoints().with_max_requests(0);
    let result = client.endpoints().get_list(&query).await;
    assert!(matches!(result, Err(Error::InvalidArgument { .. })));
}

#[tokio::test]
async fn test_endpoint_list_custom_filter_without_sort() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/endpoint"))
        .and(query_param("filter", r#"{"status":"Unknown"}"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let query = ListQuery::endpoints()
        .with_filter(r#"{"status":"Unknown"}"#)
        .without_sort();
    client.endpoints().get_list(&query).await.unwrap().unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].url.query_pairs().all(|(k, _)| k != "sort"));
}

// ── Session action tests ────────────────────────────────────────────

#[tokio::test]
async fn test_disconnect_session() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/session/1234/disconnect"))
        .and(body_json(json!({ "id": "1234", "confirm_disconnect": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": 0,
            "message": "Disconnect request sent"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.sessions().disconnect("1234").await.unwrap().unwrap();

    assert_eq!(result["message"], "Disconnect request sent");
}

#[tokio::test]
async fn test_disconnect_unknown_session_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/session/missing/disconnect"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "title": "Not Found" })))
        .mount(&server)
        .await;

    let result = client.sessions().disconnect("missing").await.unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_reauthorize_session() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/session/1234/reauthorize"))
        .and(body_json(json!({
            "id": "1234",
            "confirm_reauthorize": true,
            "reauthorize_profile": "[AOS-CX - Bounce Switch Port]"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": 0 })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client
        .sessions()
        .reauthorize("1234", "[AOS-CX - Bounce Switch Port]")
        .await
        .unwrap();

    assert_eq!(result, Some(json!({ "error": 0 })));
}

// ── Endpoint tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_create_endpoint() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/endpoint"))
        .and(body_json(json!({
            "mac_address": "001122334455",
            "status": "Known",
            "description": "lab printer",
            "attributes": { "Location": "B2" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 3001,
            "mac_address": "001122334455",
            "status": "Known"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let extras = EndpointExtras {
        description: Some("lab printer".into()),
        attributes: Some(item(json!({ "Location": "B2" }))),
        ..EndpointExtras::default()
    };
    let created = client
        .endpoints()
        .create("001122334455", "Known", &extras)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(created["id"], 3001);
}

#[tokio::test]
async fn test_create_endpoint_requires_201() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/endpoint"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 3001 })))
        .mount(&server)
        .await;

    let result = client
        .endpoints()
        .create("001122334455", "Unknown", &EndpointExtras::default())
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_create_endpoint_rejects_bad_status() {
    let (server, client) = setup().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let result = client
        .endpoints()
        .create("001122334455", "Blocked", &EndpointExtras::default())
        .await;

    assert!(matches!(result, Err(Error::InvalidArgument { .. })));
}

#[tokio::test]
async fn test_update_endpoint_sends_only_given_fields() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/endpoint/mac-address/001122334455"))
        .and(body_json(json!({ "description": "moved", "status": "Disabled" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3001,
            "description": "moved",
            "status": "Disabled"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let update = EndpointUpdate {
        description: Some("moved".into()),
        status: Some(EndpointStatus::Disabled),
        ..EndpointUpdate::default()
    };
    let updated = client
        .endpoints()
        .update_fields_by_mac("001122334455", &update)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated["status"], "Disabled");
}

#[tokio::test]
async fn test_update_endpoint_server_error_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/endpoint/mac-address/AA:BB:CC:DD:EE:FF"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let update = EndpointUpdate {
        description: Some("x".into()),
        ..EndpointUpdate::default()
    };
    let result = client
        .endpoints()
        .update_fields_by_mac("AA:BB:CC:DD:EE:FF", &update)
        .await
        .unwrap();

    assert!(result.is_none());
}

// ── Static host list tests ──────────────────────────────────────────

fn host_entries() -> Value {
    json!([
        { "host_address": "10.1.1.1", "host_address_desc": "printer" },
        { "host_address": "10.1.1.2", "host_address_desc": "camera" }
    ])
}

#[tokio::test]
async fn test_get_host_entries() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/static-host-list/name/lab-devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3002,
            "name": "lab-devices",
            "host_format": "list",
            "host_type": "IPAddress",
            "host_entries": host_entries()
        })))
        .mount(&server)
        .await;

    let entries = client
        .static_host_lists()
        .get_host_entries("lab-devices")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["host_address"], "10.1.1.2");
}

#[tokio::test]
async fn test_get_host_entries_without_field_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/static-host-list/name/lab-devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 3002 })))
        .mount(&server)
        .await;

    let result = client
        .static_host_lists()
        .get_host_entries("lab-devices")
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_replace_host_entries() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/static-host-list/name/lab-devices"))
        .and(body_json(json!({ "host_entries": host_entries() })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "lab-devices",
            "host_entries": host_entries()
        })))
        .expect(1)
        .mount(&server)
        .await;

    let entries: Vec<Item> = match host_entries() {
        Value::Array(values) => values.into_iter().map(item).collect(),
        _ => unreachable!(),
    };
    let replaced = client
        .static_host_lists()
        .replace_host_entries("lab-devices", &entries)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(replaced, entries);
}

#[tokio::test]
async fn test_replace_with_empty_entries_sends_nothing() {
    let (server, client) = setup().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = client
        .static_host_lists()
        .replace_host_entries("lab-devices", &[])
        .await;

    assert!(matches!(result, Err(Error::InvalidArgument { .. })));
}

#[tokio::test]
async fn test_host_list_name_is_one_encoded_segment() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/static-host-list/name/lab%232"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "host_entries": host_entries()
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(
            "/api/static-host-list/name/..%2F..%2Fendpoint%2Fmac-address%2FAA",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "host_entries": host_entries()
        })))
        .expect(1)
        .mount(&server)
        .await;

    let entries: Vec<Item> = match host_entries() {
        Value::Array(values) => values.into_iter().map(item).collect(),
        _ => unreachable!(),
    };
    let lists = client.static_host_lists();
    for name in ["lab#2", "../../endpoint/mac-address/AA"] {
        let replaced = lists.replace_host_entries(name, &entries).await.unwrap();
        assert_eq!(replaced, Some(entries.clone()), "name {name}");
    }
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_dot_segment_ids_send_nothing() {
    let (server, client) = setup().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let result = client.sessions().disconnect("..").await;
    assert!(matches!(result, Err(Error::InvalidArgument { .. })));

    let result = client
        .endpoints()
        .update_fields_by_mac("", &EndpointUpdate::default())
        .await;
    assert!(matches!(result, Err(Error::InvalidArgument { .. })));
}
