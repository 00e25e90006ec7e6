//! HTTP relay to remote queue servers.

use std::time::Duration;

use async_trait::async_trait;

use crate::backend::QueueBackend;
use crate::error::{QueueError, Result};
use crate::types::{Request, Response};

/// Forwards requests as JSON to `POST {server}/invoke`.
///
/// The server is picked by partition number, so every request for a given
/// shard lands on the same server while the server list is unchanged.
#[derive(Debug, Clone)]
pub struct HttpQueueBackend {
    client: reqwest::Client,
    servers: Vec<String>,
}

impl HttpQueueBackend {
    /// Create a relay over `servers`.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Transport` if `servers` is empty or the HTTP
    /// client cannot be built.
    pub fn new(servers: Vec<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| QueueError::Transport(format!("failed to build HTTP client: {e}")))?;
        Self::with_client(client, servers)
    }

    /// Create a relay with a custom reqwest client.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Transport` if `servers` is empty.
    pub fn with_client(client: reqwest::Client, servers: Vec<String>) -> Result<Self> {
        if servers.is_empty() {
            return Err(QueueError::Transport("no queue servers configured".into()));
        }
        let servers = servers
            .into_iter()
            .map(|s| s.trim_end_matches('/').to_string())
            .collect();
        Ok(Self { client, servers })
    }

    /// The server responsible for `partition`.
    #[must_use]
    pub fn server_for(&self, partition: u32) -> &str {
        &self.servers[partition as usize % self.servers.len()]
    }
}

#[async_trait]
impl QueueBackend for HttpQueueBackend {
    async fn invoke(&self, request: Request) -> Result<Response> {
        let url = format!("{}/invoke", self.server_for(request.partition_number));

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| QueueError::Transport(format!("queue server request failed: {e}")))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let payload = response
            .bytes()
            .await
            .map_err(|e| QueueError::Transport(format!("failed to read queue reply: {e}")))?;

        tracing::debug!(
            url = %url,
            queue_id = %request.queue_id,
            status = %status,
            "Queue server replied"
        );

        Ok(Response {
            status_code: status.as_u16(),
            payload: payload.to_vec(),
            content_type,
        })
    }
}
