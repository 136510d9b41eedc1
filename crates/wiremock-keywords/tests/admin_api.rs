//! Integration tests for the admin client against a local HTTP mock standing
//! in for WireMock's admin API.

use httpmock::prelude::*;
use serde_json::json;
use wiremock_keywords::{
    DefaultMappingArgs, Error, MockAdminClient, RequestMatcher, ResponseSpec, UrlMatchMode,
};

fn client_for(server: &MockServer) -> MockAdminClient {
    MockAdminClient::new(&server.base_url()).unwrap()
}

// =============================================================================
// Mapping registration
// =============================================================================

#[test]
fn test_register_default_mapping_posts_path_pattern_mapping() {
    let server = MockServer::start();
    let mapping = server.mock(|when, then| {
        when.method(POST)
            .path("/__admin/mappings")
            .header("content-type", "application/json")
            .json_body(json!({
                "request": {"method": "GET", "urlPathPattern": "/foo.*"},
                "response": {"status": 404, "statusMessage": "Missing"}
            }));
        then.status(201);
    });

    let mut args = DefaultMappingArgs::new("GET", "/foo.*");
    args.status = json!("404");
    args.status_message = Some("Missing".to_string());

    client_for(&server).register_default_mapping(args).unwrap();

    mapping.assert();
}

#[test]
fn test_register_mapping_sends_full_matcher() {
    let server = MockServer::start();
    let mapping = server.mock(|when, then| {
        when.method(POST).path("/__admin/mappings").json_body(json!({
            "request": {
                "method": "POST",
                "urlPattern": "/api/users\\?.*",
                "queryParameters": {"page": {"matches": "[0-9]+"}},
                "headers": {"X-Trace": {"matches": ".+", "caseInsensitive": true}},
                "cookies": {"session": {"matches": "abc.*"}},
                "bodyPatterns": [{
                    "equalToJson": "{\"name\":\"ada\",\"roles\":[\"admin\"]}",
                    "ignoreArrayOrder": true,
                    "ignoreExtraElements": true
                }]
            },
            "response": {
                "status": 201,
                "statusMessage": "Created",
                "headers": {"Content-Type": "application/json"},
                "jsonBody": {"id": 1},
                "transformers": ["response-template"]
            }
        }));
        then.status(201);
    });

    let request = RequestMatcher::builder("POST", "/api/users\\?.*")
        .url_match_mode(UrlMatchMode::UrlPattern)
        .query_parameter("page", "[0-9]+")
        .header("X-Trace", ".+")
        .cookie("session", "abc.*")
        .json_body(&json!({"roles": ["admin"], "name": "ada"}))
        .unwrap()
        .regex_matching(true)
        .build()
        .unwrap();
    let response = ResponseSpec::builder(201)
        .status_message("Created")
        .header("Content-Type", "application/json")
        .json_body(&json!({"id": 1}))
        .unwrap()
        .template(true)
        .build();

    client_for(&server).register_mapping(request, response).unwrap();

    mapping.assert();
}

#[test]
fn test_register_raw_string_is_passed_through() {
    let server = MockServer::start();
    let raw = r#"{"request": {"method": "ANY", "url": "/raw"}, "response": {"status": 418}}"#;
    let mapping = server.mock(|when, then| {
        when.method(POST).path("/__admin/mappings").body(raw);
        then.status(201);
    });

    client_for(&server).register_mapping_raw(raw).unwrap();

    mapping.assert();
}

#[test]
fn test_register_raw_json_value() {
    let server = MockServer::start();
    let data = json!({"request": {"method": "GET", "url": "/v"}, "response": {"status": 200}});
    let mapping = server.mock(|when, then| {
        when.method(POST).path("/__admin/mappings").json_body(data.clone());
        then.status(201);
    });

    client_for(&server).register_mapping_raw(data).unwrap();

    mapping.assert();
}

#[test]
fn test_server_error_is_surfaced_verbatim() {
    let server = MockServer::start();
    let error_body = r#"{"errors":[{"code":10,"title":"Error parsing JSON"}]}"#;
    server.mock(|when, then| {
        when.method(POST).path("/__admin/mappings");
        then.status(400).body(error_body);
    });

    let err = client_for(&server)
        .register_default_mapping(DefaultMappingArgs::new("GET", "/x"))
        .unwrap_err();

    match err {
        Error::MockServer { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, error_body);
        }
        other => panic!("expected MockServer error, got {other}"),
    }
}

#[test]
fn test_base_url_path_is_replaced() {
    let server = MockServer::start();
    let reset = server.mock(|when, then| {
        when.method(POST).path("/__admin/mappings/reset");
        then.status(200);
    });

    let client = MockAdminClient::new(&server.url("/some/prefix")).unwrap();
    client.reset_mappings().unwrap();

    reset.assert();
}

#[test]
fn test_connection_refused_is_transport_error() {
    // Port 1 is reserved and nothing listens there
    let client = MockAdminClient::new("http://127.0.0.1:1").unwrap();
    let err = client.reset_mappings().unwrap_err();
    assert!(matches!(err, Error::Transport { .. }), "got {err}");
}

// =============================================================================
// Resets
// =============================================================================

#[test]
fn test_reset_mappings_is_idempotent() {
    let server = MockServer::start();
    let reset = server.mock(|when, then| {
        when.method(POST).path("/__admin/mappings/reset");
        then.status(200);
    });

    let client = client_for(&server);
    client.reset_mappings().unwrap();
    client.reset_mappings().unwrap();

    reset.assert_hits(2);
}

#[test]
fn test_reset_request_log() {
    let server = MockServer::start();
    let reset = server.mock(|when, then| {
        when.method(POST).path("/__admin/requests/reset");
        then.status(200);
    });

    client_for(&server).reset_request_log().unwrap();

    reset.assert();
}

#[test]
fn test_reset_server_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/__admin/requests/reset");
        then.status(500).body("boom");
    });

    let err = client_for(&server).reset_request_log().unwrap_err();
    assert!(matches!(err, Error::MockServer { status: 500, .. }));
}

// =============================================================================
// Request journal
// =============================================================================

#[test]
fn test_find_requests_in_server_order() {
    let server = MockServer::start();
    let find = server.mock(|when, then| {
        when.method(POST)
            .path("/__admin/requests/find")
            .json_body(json!({"urlPathPattern": "/api/.*", "method": "POST"}));
        then.status(200).json_body(json!({
            "requests": [
                {"url": "/api/a", "method": "POST", "body": "{\"n\":1}"},
                {"url": "/api/b", "method": "POST", "body": "{\"n\":2}"}
            ]
        }));
    });

    let client = client_for(&server);
    let requests = client.find_requests("/api/.*", Some("POST")).unwrap();

    find.assert();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url.as_deref(), Some("/api/a"));
    assert_eq!(requests[1].url.as_deref(), Some("/api/b"));
}

#[test]
fn test_find_requests_without_method() {
    let server = MockServer::start();
    let find = server.mock(|when, then| {
        when.method(POST)
            .path("/__admin/requests/find")
            .json_body(json!({"urlPathPattern": "/health"}));
        then.status(200).json_body(json!({"requests": []}));
    });

    let requests = client_for(&server).find_requests("/health", None).unwrap();

    find.assert();
    assert!(requests.is_empty());
}

#[test]
fn test_previous_request_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/__admin/requests/find");
        then.status(200).json_body(json!({"requests": []}));
    });

    let client = client_for(&server);
    assert!(client.find_requests("/api", Some("POST")).unwrap().is_empty());

    let err = client.get_previous_request("/api", Some("POST")).unwrap_err();
    match err {
        Error::NotFound {
            url_pattern,
            method,
        } => {
            assert_eq!(url_pattern, "/api");
            assert_eq!(method.as_deref(), Some("POST"));
        }
        other => panic!("expected NotFound, got {other}"),
    }
}

#[test]
fn test_previous_request_body_is_last_one() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/__admin/requests/find");
        then.status(200).json_body(json!({
            "requests": [
                {"url": "/orders", "body": "{\"id\":1}", "loggedDate": 1},
                {"url": "/orders", "body": "{\"id\":2,\"items\":[\"x\"]}", "loggedDate": 2}
            ]
        }));
    });

    let client = client_for(&server);

    let previous = client.get_previous_request("/orders", None).unwrap();
    assert_eq!(previous.metadata["loggedDate"], json!(2));

    let body = client.get_previous_request_body("/orders", None).unwrap();
    assert_eq!(body, json!({"id": 2, "items": ["x"]}));
}

#[test]
fn test_previous_request_body_not_json() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/__admin/requests/find");
        then.status(200)
            .json_body(json!({"requests": [{"url": "/form", "body": "a=1&b=2"}]}));
    });

    let err = client_for(&server)
        .get_previous_request_body("/form", None)
        .unwrap_err();
    assert!(matches!(err, Error::BodyDecode(_)), "got {err}");
}

#[test]
fn test_malformed_find_reply() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/__admin/requests/find");
        then.status(200).body("<html>not json</html>");
    });

    let err = client_for(&server).find_requests("/x", None).unwrap_err();
    assert!(matches!(err, Error::ResponseDecode(_)), "got {err}");
}
