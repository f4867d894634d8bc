//! Link engine tests against an in-memory transport
//!
//! These drive the full resolve → fetch index → negotiate → follow path
//! without a network, counting the requests the engine makes.

use std::sync::Arc;
use std::time::Duration;

use http::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use ladok_client::testing::StubTransport;
use ladok_client::{
    ApiProfile, FollowOptions, HttpMethod, LadokApi, LadokClient, Link, RawResponse,
};
use pretty_assertions::assert_eq;
use serde_json::json;

const BASE: &str = "https://host";
const RESULTAT_INDEX: &str = "https://host/resultat/service/index";
const RESULTAT_TYPE: &str = "application/vnd.ladok-resultat+json";
const A_REL: &str = "http://relations.ladok.se/resultat/aRel";

fn client_with(stub: &Arc<StubTransport>) -> LadokClient {
    LadokClient::builder(BASE)
        .transport(stub.clone())
        .build()
        .unwrap()
}

fn resultat_index() -> serde_json::Value {
    json!({
        "link": [
            {"rel": A_REL, "method": "GET", "uri": "https://host/resultat/42"},
            {"rel": A_REL, "method": "POST", "uri": "https://host/resultat/42/new"},
            {"rel": "http://relations.ladok.se/resultat/dup", "method": "GET", "uri": "https://host/resultat/first"},
            {"rel": "http://relations.ladok.se/resultat/dup", "method": "GET", "uri": "https://host/resultat/last"}
        ]
    })
}

// =============================================================================
// Index resolution
// =============================================================================

#[tokio::test]
async fn test_find_index_link_returns_indexed_link() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(RESULTAT_INDEX, resultat_index());
    let client = client_with(&stub);

    let link = client.find_index_link(A_REL, HttpMethod::Get).await.unwrap();
    assert_eq!(
        link,
        Link::new(A_REL, HttpMethod::Get, "https://host/resultat/42")
    );

    let post = client.find_index_link(A_REL, HttpMethod::Post).await.unwrap();
    assert_eq!(post.uri, "https://host/resultat/42/new");
}

#[tokio::test]
async fn test_index_fetch_negotiates_accept() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(RESULTAT_INDEX, resultat_index());
    let client = client_with(&stub);

    client.find_index_link(A_REL, HttpMethod::Get).await.unwrap();

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Get);
    assert_eq!(requests[0].request.headers.get(ACCEPT).unwrap(), RESULTAT_TYPE);
    assert!(requests[0]
        .request
        .overrides
        .session
        .as_ref()
        .unwrap()
        .same_as(client.session()));
}

#[tokio::test]
async fn test_duplicate_links_last_wins() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(RESULTAT_INDEX, resultat_index());
    let client = client_with(&stub);

    let link = client
        .find_index_link("http://relations.ladok.se/resultat/dup", HttpMethod::Get)
        .await
        .unwrap();
    assert_eq!(link.uri, "https://host/resultat/last");
}

#[tokio::test]
async fn test_index_is_fetched_once() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(RESULTAT_INDEX, resultat_index());
    let client = client_with(&stub);

    client.index().links_for("resultat").await.unwrap();
    client.index().links_for("resultat").await.unwrap();
    client.find_index_link(A_REL, HttpMethod::Post).await.unwrap();

    assert_eq!(stub.count_for(RESULTAT_INDEX), 1);
    assert_eq!(client.index().cached_services(), vec!["resultat".to_string()]);
}

#[tokio::test]
async fn test_concurrent_first_lookups_share_one_fetch() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(RESULTAT_INDEX, resultat_index());
    let client = client_with(&stub);

    let (a, b) = tokio::join!(
        client.index().links_for("resultat"),
        client.index().links_for("resultat")
    );
    assert_eq!(a.unwrap().len(), 4);
    assert_eq!(b.unwrap().len(), 4);
    assert_eq!(stub.count_for(RESULTAT_INDEX), 1);
}

#[tokio::test]
async fn test_failed_index_fetch_is_not_cached() {
    let stub = Arc::new(StubTransport::new());
    let client = client_with(&stub);

    let err = client.index().links_for("resultat").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(client.index().cached_services().is_empty());

    stub.respond_json(RESULTAT_INDEX, resultat_index());
    assert_eq!(client.index().links_for("resultat").await.unwrap().len(), 4);
    assert_eq!(stub.count_for(RESULTAT_INDEX), 2);
}

#[tokio::test]
async fn test_index_without_links_fails() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(RESULTAT_INDEX, json!({"other": true}));
    let client = client_with(&stub);

    let err = client.find_index_link(A_REL, HttpMethod::Get).await.unwrap_err();
    assert!(err.as_api_error().is_some());
}

#[tokio::test]
async fn test_find_index_link_argument_errors() {
    let stub = Arc::new(StubTransport::new());
    let client = client_with(&stub);

    assert!(client.find_index_link("", HttpMethod::Get).await.is_err());
    assert!(client.find_index_link("self", HttpMethod::Get).await.is_err());
    assert!(client.index().links_for("").await.is_err());
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn test_link_not_found() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(RESULTAT_INDEX, resultat_index());
    let client = client_with(&stub);

    let err = client
        .find_index_link(A_REL, HttpMethod::Delete)
        .await
        .unwrap_err();
    assert_eq!(
        err.as_api_error().unwrap().message,
        format!("link not found for {}, DELETE", A_REL)
    );
}

#[tokio::test]
async fn test_custom_profile_drives_relations_and_media_types() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(
        RESULTAT_INDEX,
        json!({"link": [{"rel": "http://relations.example.org/resultat/aRel", "method": "GET", "uri": "https://host/resultat/42"}]}),
    );
    let client = LadokClient::builder(BASE)
        .profile(ApiProfile::new("acme", "http://relations.example.org/"))
        .transport(stub.clone())
        .build()
        .unwrap();

    let link = client
        .find_index_link("http://relations.example.org/resultat/aRel", HttpMethod::Get)
        .await
        .unwrap();
    assert_eq!(link.uri, "https://host/resultat/42");
    assert_eq!(
        stub.requests()[0].request.headers.get(ACCEPT).unwrap(),
        "application/vnd.acme-resultat+json"
    );
}

// =============================================================================
// Following links
// =============================================================================

#[tokio::test]
async fn test_follow_post_encodes_body_and_negotiates() {
    let stub = Arc::new(StubTransport::new());
    stub.respond(
        HttpMethod::Post,
        "https://host/resultat/42",
        RawResponse::json(&json!({"created": true, "id": 7})),
    );
    let client = client_with(&stub);

    let link = Link::self_link(HttpMethod::Post, "https://host/resultat/42");
    let value = client
        .follow_link(&link, FollowOptions::new().body(json!({"a": 1})))
        .await
        .unwrap();
    assert_eq!(value, json!({"created": true, "id": 7}));

    let sent = &stub.requests()[0];
    assert_eq!(sent.method, HttpMethod::Post);
    assert_eq!(sent.request.body.as_deref(), Some(r#"{"a":1}"#));
    assert_eq!(sent.request.headers.get(CONTENT_TYPE).unwrap(), RESULTAT_TYPE);
    assert_eq!(sent.request.headers.get(ACCEPT).unwrap(), RESULTAT_TYPE);
}

#[tokio::test]
async fn test_follow_get_merges_query_and_headers() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(
        "https://host/resultat/sok?limit=10&page=2",
        json!({"Resultat": []}),
    );
    let client = client_with(&stub);

    let link = Link::self_link(HttpMethod::Get, "https://host/resultat/sok?page=1&limit=10");
    let options = FollowOptions::new()
        .query("page", "2")
        .try_header("User-Agent", "KTH")
        .unwrap()
        .timeout(Duration::from_secs(3));
    let value = client.follow_link(&link, options).await.unwrap();
    assert_eq!(value, json!({"Resultat": []}));

    let sent = &stub.requests()[0];
    assert!(sent.request.body.is_none());
    assert_eq!(sent.request.headers.get(USER_AGENT).unwrap(), "KTH");
    assert_eq!(sent.request.headers.get(ACCEPT).unwrap(), RESULTAT_TYPE);
    assert!(sent.request.headers.get(CONTENT_TYPE).is_none());
    assert_eq!(sent.request.overrides.timeout, Some(Duration::from_secs(3)));
}

#[tokio::test]
async fn test_follow_delete_is_bodyless() {
    let stub = Arc::new(StubTransport::new());
    stub.respond(
        HttpMethod::Delete,
        "https://host/resultat/42",
        RawResponse::new(204, ""),
    );
    let client = client_with(&stub);

    let link = Link::self_link(HttpMethod::Delete, "https://host/resultat/42");
    let value = client
        .follow_link(&link, FollowOptions::new().body(json!({"ignored": true})))
        .await
        .unwrap();
    assert!(value.is_null());
    assert!(stub.requests()[0].request.body.is_none());
}

#[tokio::test]
async fn test_follow_unsupported_method() {
    let stub = Arc::new(StubTransport::new());
    let client = client_with(&stub);

    let link = Link::self_link(
        HttpMethod::Other("PATCH".to_string()),
        "https://host/resultat/42",
    );
    let err = client
        .follow_link(&link, FollowOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.as_api_error().unwrap().message, "unsupported method PATCH");
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn test_follow_requires_link_uri() {
    let stub = Arc::new(StubTransport::new());
    let client = client_with(&stub);

    let link = Link::new(A_REL, HttpMethod::Get, "");
    assert!(client.follow_link(&link, FollowOptions::new()).await.is_err());
}

#[tokio::test]
async fn test_follow_error_status_is_api_error() {
    let stub = Arc::new(StubTransport::new());
    stub.respond(
        HttpMethod::Put,
        "https://host/resultat/42",
        RawResponse::new(409, r#"{"message":"Conflict"}"#),
    );
    let client = client_with(&stub);

    let link = Link::self_link(HttpMethod::Put, "https://host/resultat/42");
    let err = client
        .follow_link(&link, FollowOptions::new().body(json!({})))
        .await
        .unwrap_err();
    let api = err.as_api_error().unwrap();
    assert_eq!(api.status, Some(409));
    assert_eq!(api.message, "Conflict");
}

#[tokio::test]
async fn test_follow_link_as_typed() {
    #[derive(serde::Deserialize)]
    struct Resultat {
        id: u32,
    }

    let stub = Arc::new(StubTransport::new());
    stub.respond_json("https://host/resultat/42", json!({"id": 42}));
    let client = client_with(&stub);

    let link = Link::self_link(HttpMethod::Get, "https://host/resultat/42");
    let resultat: Resultat = client
        .follow_link_as(&link, FollowOptions::new())
        .await
        .unwrap();
    assert_eq!(resultat.id, 42);
}

#[tokio::test]
async fn test_create_link_from_path_round_trip() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json("https://host/kataloginformation/grunddata", json!({"ok": 1}));
    let client = client_with(&stub);

    let link = client.create_link_from_path("/kataloginformation/grunddata", HttpMethod::Get);
    let value = client.follow_link(&link, FollowOptions::new()).await.unwrap();
    assert_eq!(value, json!({"ok": 1}));
    assert_eq!(
        stub.requests()[0].request.headers.get(ACCEPT).unwrap(),
        "application/vnd.ladok-kataloginformation+json"
    );
}

// =============================================================================
// Service status
// =============================================================================

#[tokio::test]
async fn test_status_for_failing_transport_is_false() {
    let stub = Arc::new(StubTransport::failing());
    let client = client_with(&stub);

    assert!(!client.status_for_service("missing").await);
}

#[tokio::test]
async fn test_status_for_service() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(RESULTAT_INDEX, resultat_index());
    stub.respond(
        HttpMethod::Get,
        "https://host/examen/service/index",
        RawResponse::new(200, "not json"),
    );
    let client = client_with(&stub);

    assert!(client.status_for_service("resultat").await);
    assert!(!client.status_for_service("examen").await);
    assert!(!client.status_for_service("studiedeltagande").await);
    assert!(!client.status_for_service("").await);
}

#[tokio::test]
async fn test_status_does_not_fill_cache() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(RESULTAT_INDEX, resultat_index());
    let client = client_with(&stub);

    assert!(client.status_for_service("resultat").await);
    assert!(client.status_for_service("resultat").await);
    assert_eq!(stub.count_for(RESULTAT_INDEX), 2);
    assert!(client.index().cached_services().is_empty());
}

// =============================================================================
// Trait objects
// =============================================================================

#[tokio::test]
async fn test_client_as_trait_object() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(RESULTAT_INDEX, resultat_index());
    let api: Arc<dyn LadokApi> = Arc::new(client_with(&stub));

    let link = api.find_index_link(A_REL, HttpMethod::Get).await.unwrap();
    let links = vec![link.clone()];
    assert_eq!(api.find_link(&links, A_REL, HttpMethod::Get).unwrap(), link);
}
