//! Common test utilities and fixtures.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header, HeaderName, HeaderValue};
use axum_test::TestServer;

use shardgate_auth::{AccountService, SubjectPolicy, TokenIssuer, TOKEN_TTL_HOURS};
use shardgate_gateway::{create_router, GatewayConfig, GatewayState};
use shardgate_queue::{QueueBackend, QueueError, Request, Response};
use shardgate_store::MemoryStore;

/// Signing secret shared by every harness.
pub const SECRET: &str = "integration-test-secret";

/// What the scripted backend answers with.
#[derive(Clone)]
pub enum Reply {
    /// `200` with a JSON body naming the queue, partition and resource.
    Summary,
    /// A fixed response.
    Fixed(Response),
    /// A fixed failure.
    Fail(QueueError),
    /// Never answer.
    Stall,
}

/// A backend that records every request and answers from a script.
pub struct ScriptedBackend {
    reply: Reply,
    seen: Mutex<Vec<Request>>,
}

impl ScriptedBackend {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub fn seen(&self) -> Vec<Request> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last(&self) -> Request {
        self.seen().pop().expect("backend was not invoked")
    }
}

#[async_trait]
impl QueueBackend for ScriptedBackend {
    async fn invoke(&self, request: Request) -> shardgate_queue::Result<Response> {
        self.seen.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Summary => Ok(Response::json(&serde_json::json!({
                "queue_id": request.queue_id.to_string(),
                "partition": request.partition_number,
                "resource": request.resource,
            }))
            .unwrap()),
            Reply::Fixed(response) => Ok(response.clone()),
            Reply::Fail(err) => Err(err.clone()),
            Reply::Stall => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                unreachable!("stalled backend woke up")
            }
        }
    }
}

/// A router over an in-memory store and a scripted backend.
pub struct Harness {
    pub server: TestServer,
    pub backend: Arc<ScriptedBackend>,
    pub store: Arc<MemoryStore>,
    pub issuer: Arc<TokenIssuer>,
}

impl Harness {
    pub fn new(reply: Reply) -> Self {
        Self::with_config(reply, GatewayConfig::default())
    }

    pub fn with_config(reply: Reply, config: GatewayConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let issuer = Arc::new(issuer());
        let accounts =
            AccountService::new(Arc::clone(&store), Arc::clone(&issuer), SubjectPolicy::RandomNonce);
        let backend = Arc::new(ScriptedBackend::new(reply));

        let state = GatewayState::new(Arc::clone(&backend), accounts, config);
        let server = TestServer::new(create_router(state)).unwrap();

        Self {
            server,
            backend,
            store,
            issuer,
        }
    }

    /// A valid token for subject `7`.
    pub fn token(&self) -> String {
        self.issuer.mint(7).unwrap().token
    }
}

/// The issuer every harness uses.
pub fn issuer() -> TokenIssuer {
    TokenIssuer::new(SECRET.as_bytes(), chrono::Duration::hours(TOKEN_TTL_HOURS))
}

/// An `Authorization` header.
pub fn authorization(value: &str) -> (HeaderName, HeaderValue) {
    (header::AUTHORIZATION, HeaderValue::from_str(value).unwrap())
}

/// A `Bearer` header for `token`.
pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    authorization(&format!("Bearer {token}"))
}
