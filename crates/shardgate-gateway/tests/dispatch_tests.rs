//! Route resolution and dispatch through the full router.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use common::{bearer, Harness, Reply};
use shardgate_auth::{AccountService, SubjectPolicy};
use shardgate_core::PartitionStrategy;
use shardgate_gateway::{create_router, GatewayConfig, GatewayState};
use shardgate_queue::{EchoHandler, Handler, LocalQueues, Method, QueueError, Response};
use shardgate_store::MemoryStore;

#[tokio::test]
async fn partitioned_route_uses_modulo() {
    let h = Harness::new(Reply::Summary);
    let (name, value) = bearer(&h.token());

    let response = h.server.get("/air-bo/123/orders").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({"queue_id": "air-bo:10", "partition": 3, "resource": "123/orders"})
    );
    let request = h.backend.last();
    assert_eq!(request.partition_dividend, 123);
    assert_eq!(request.method, Method::Get);
}

#[tokio::test]
async fn partition_always_in_range() {
    let h = Harness::new(Reply::Summary);
    let token = h.token();

    for dividend in [1_u64, 9, 10, 11, 99, 1_000_003] {
        let (name, value) = bearer(&token);
        h.server
            .get(&format!("/air-bo/{dividend}/orders"))
            .add_header(name, value)
            .await;
        let request = h.backend.last();
        assert_eq!(u64::from(request.partition_number), dividend % 10);
    }
}

#[tokio::test]
async fn zero_dividend_is_rejected_before_dispatch() {
    let h = Harness::new(Reply::Summary);
    let (name, value) = bearer(&h.token());

    let response = h.server.post("/air-bo/0/orders").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text(),
        "partition dividend in partitioned queues must be not 0"
    );
    assert!(h.backend.seen().is_empty());
}

#[tokio::test]
async fn non_numeric_dividend_is_rejected() {
    let h = Harness::new(Reply::Summary);
    let (name, value) = bearer(&h.token());

    let response = h.server.get("/air-bo/abc/orders").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "wrong partition dividend abc");
}

#[tokio::test]
async fn no_party_and_unknown_aliases_ignore_dividend() {
    let h = Harness::new(Reply::Summary);
    let token = h.token();

    let (name, value) = bearer(&token);
    let response = h.server.get("/manifest/flights").add_header(name, value).await;
    assert_eq!(
        response.json::<Value>(),
        json!({"queue_id": "manifest:0", "partition": 0, "resource": "flights"})
    );

    let (name, value) = bearer(&token);
    let response = h.server.get("/unknown/0/things").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let request = h.backend.last();
    assert_eq!(request.queue_id.to_string(), "unknown:0");
    assert_eq!(request.partition_dividend, 0);
    assert_eq!(request.resource, "0/things");
}

#[tokio::test]
async fn help_and_item_routes() {
    let h = Harness::new(Reply::Summary);
    let token = h.token();

    let (name, value) = bearer(&token);
    let response = h.server.get("/air-bo/27").add_header(name, value).await;
    assert_eq!(
        response.json::<Value>(),
        json!({"queue_id": "air-bo:10", "partition": 7, "resource": "27"})
    );

    let (name, value) = bearer(&token);
    let response = h
        .server
        .patch("/air-bo/27/orders/991")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let request = h.backend.last();
    assert_eq!(request.method, Method::Patch);
    assert_eq!(request.resource, "27/orders/991");
}

#[tokio::test]
async fn query_and_body_are_forwarded() {
    let h = Harness::new(Reply::Summary);
    let (name, value) = bearer(&h.token());

    h.server
        .put("/air-bo/5/orders?tag=a&limit=2&tag=b")
        .add_header(name, value)
        .json(&json!({"qty": 3}))
        .await;

    let request = h.backend.last();
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.query["tag"], vec!["a".to_string(), "b".to_string()]);
    assert_eq!(request.query["limit"], vec!["2".to_string()]);
    assert_eq!(
        serde_json::from_slice::<Value>(&request.body).unwrap(),
        json!({"qty": 3})
    );
}

#[tokio::test]
async fn backend_reply_is_written_verbatim() {
    let reply = Response::new(201, b"<created/>".to_vec()).with_content_type("application/xml");
    let h = Harness::new(Reply::Fixed(reply));
    let (name, value) = bearer(&h.token());

    let response = h.server.post("/manifest/flights").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(response.header("content-type"), "application/xml");
    assert_eq!(response.text(), "<created/>");
}

#[tokio::test]
async fn backend_failure_passes_through() {
    let h = Harness::new(Reply::Fail(QueueError::backend(409, "order already shipped")));
    let (name, value) = bearer(&h.token());

    let response = h.server.post("/air-bo/4/orders").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.text(), "order already shipped");
    assert_eq!(h.backend.seen().len(), 1);
}

#[tokio::test]
async fn stalled_backend_times_out_with_408() {
    let config = GatewayConfig {
        dispatch_timeout_seconds: 1,
        ..GatewayConfig::default()
    };
    let h = Harness::with_config(Reply::Stall, config);
    let (name, value) = bearer(&h.token());

    let started = Instant::now();
    let response = h.server.get("/air-bo/4/orders").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(response.text(), "Request Timeout: no reply within 1000ms");
    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(h.backend.seen().len(), 1);
}

#[tokio::test]
async fn write_timeout_equal_to_dispatch_bound_still_describes_408() {
    let config = GatewayConfig {
        dispatch_timeout_seconds: 2,
        write_timeout_seconds: 2,
        ..GatewayConfig::default()
    };
    let h = Harness::with_config(Reply::Stall, config);
    let (name, value) = bearer(&h.token());

    let response = h.server.get("/air-bo/4/orders").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(response.text(), "Request Timeout: no reply within 2000ms");
    assert_eq!(response.header("access-control-allow-origin"), "*");
}

#[tokio::test]
async fn root_lists_sorted_aliases() {
    let h = Harness::new(Reply::Summary);
    let token = h.token();

    for path in ["/", "/api"] {
        let (name, value) = bearer(&token);
        let response = h.server.get(path).add_header(name, value).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            response.json::<Vec<String>>(),
            vec!["air-bo", "air-bo-view", "manifest"]
        );
    }
}

#[tokio::test]
async fn api_prefix_dispatches() {
    let h = Harness::new(Reply::Summary);
    let (name, value) = bearer(&h.token());

    let response = h.server.get("/api/air-bo/13/orders").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(h.backend.last().partition_number, 3);
}

#[tokio::test]
async fn fnv_strategy_is_selectable() {
    let config = GatewayConfig {
        partition_strategy: PartitionStrategy::Fnv1a,
        ..GatewayConfig::default()
    };
    let h = Harness::with_config(Reply::Summary, config);
    let (name, value) = bearer(&h.token());

    let response = h.server.get("/air-bo/123/orders").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let expected = shardgate_core::fnv1a32(b"orders123") % 10;
    assert_eq!(h.backend.last().partition_number, expected);
}

#[tokio::test]
async fn local_queues_serve_end_to_end() {
    let config = GatewayConfig::default();
    let mut builder = LocalQueues::builder();
    for (alias, count) in config.partitions.iter() {
        builder = if count == 0 {
            builder.no_party(alias, Arc::new(EchoHandler))
        } else {
            builder.partitioned(
                config.partitions.queue_id(alias),
                Box::new(|_| Arc::new(EchoHandler) as Arc<dyn Handler>),
            )
        };
    }
    let backend = Arc::new(builder.build());

    let issuer = Arc::new(common::issuer());
    let accounts = AccountService::new(
        Arc::new(MemoryStore::new()),
        Arc::clone(&issuer),
        SubjectPolicy::RandomNonce,
    );
    let server = TestServer::new(create_router(GatewayState::new(backend, accounts, config))).unwrap();
    let (name, value) = bearer(&issuer.mint(1).unwrap().token);

    let response = server
        .post("/air-bo/42/orders")
        .add_header(name, value)
        .text("hello")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let echo: Value = response.json();
    assert_eq!(echo["partition_number"], 2);
    assert_eq!(echo["resource"], "42/orders");
    assert_eq!(echo["method"], "POST");
    assert_eq!(echo["body"], "hello");
}
