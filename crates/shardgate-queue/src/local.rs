//! In-process partitioned queues.
//!
//! Every shard is a tokio task draining its own bounded channel, so requests
//! for one partition are handled in arrival order while partitions run
//! independently. No-party queues get a single worker keyed `alias:0`;
//! partitioned queues get one worker per partition, each built by a factory
//! registered under `alias:N`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::{mpsc, oneshot};

use shardgate_core::QueueId;

use crate::backend::QueueBackend;
use crate::error::{QueueError, Result};
use crate::types::{Request, Response};

/// Default capacity of each partition's channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Handles requests for one queue shard.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle a single request.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Backend` to answer with a failure status.
    async fn handle(&self, request: Request) -> Result<Response>;
}

/// Builds the handler for a partition index.
pub type HandlerFactory = Box<dyn Fn(u32) -> Arc<dyn Handler> + Send + Sync>;

struct Job {
    request: Request,
    reply: oneshot::Sender<Result<Response>>,
}

/// A set of in-process queues.
pub struct LocalQueues {
    workers: HashMap<QueueId, Vec<mpsc::Sender<Job>>>,
}

impl LocalQueues {
    /// Start building a set of queues.
    #[must_use]
    pub fn builder() -> LocalQueuesBuilder {
        LocalQueuesBuilder {
            capacity: DEFAULT_CHANNEL_CAPACITY,
            no_party: Vec::new(),
            partitioned: Vec::new(),
        }
    }

    /// Registered queue ids, sorted.
    #[must_use]
    pub fn queue_ids(&self) -> Vec<&QueueId> {
        let mut ids: Vec<_> = self.workers.keys().collect();
        ids.sort();
        ids
    }

    /// Number of workers behind `queue_id`.
    #[must_use]
    pub fn worker_count(&self, queue_id: &QueueId) -> usize {
        self.workers.get(queue_id).map_or(0, Vec::len)
    }
}

#[async_trait]
impl QueueBackend for LocalQueues {
    async fn invoke(&self, request: Request) -> Result<Response> {
        let sender = self
            .workers
            .get(&request.queue_id)
            .and_then(|senders| senders.get(request.partition_number as usize))
            .ok_or_else(|| QueueError::NoHandler(request.queue_id.to_string()))?;

        let queue_id = request.queue_id.to_string();
        let (reply, rx) = oneshot::channel();
        sender
            .send(Job { request, reply })
            .await
            .map_err(|_| QueueError::Transport(format!("worker for {queue_id} stopped")))?;

        rx.await
            .map_err(|_| QueueError::Transport(format!("worker for {queue_id} dropped the reply")))?
    }
}

/// Builder for [`LocalQueues`].
pub struct LocalQueuesBuilder {
    capacity: usize,
    no_party: Vec<(QueueId, Arc<dyn Handler>)>,
    partitioned: Vec<(QueueId, HandlerFactory)>,
}

impl LocalQueuesBuilder {
    /// Set the per-partition channel capacity.
    #[must_use]
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Register the handler of a no-party queue, keyed `alias:0`.
    #[must_use]
    pub fn no_party(mut self, alias: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        self.no_party.push((QueueId::new(alias, 0), handler));
        self
    }

    /// Register a handler factory for a partitioned queue, keyed `alias:N`.
    ///
    /// The factory is called once per partition index in `[0, N)`.
    #[must_use]
    pub fn partitioned(mut self, queue_id: QueueId, factory: HandlerFactory) -> Self {
        self.partitioned.push((queue_id, factory));
        self
    }

    /// Spawn all workers. Must run inside a tokio runtime.
    #[must_use]
    pub fn build(self) -> LocalQueues {
        let mut workers = HashMap::new();

        for (queue_id, handler) in self.no_party {
            let sender = spawn_worker(&queue_id, 0, handler, self.capacity);
            workers.insert(queue_id, vec![sender]);
        }

        for (queue_id, factory) in self.partitioned {
            let senders = (0..queue_id.partitions())
                .map(|partition| {
                    spawn_worker(&queue_id, partition, factory(partition), self.capacity)
                })
                .collect();
            workers.insert(queue_id, senders);
        }

        LocalQueues { workers }
    }
}

fn spawn_worker(
    queue_id: &QueueId,
    partition: u32,
    handler: Arc<dyn Handler>,
    capacity: usize,
) -> mpsc::Sender<Job> {
    let (tx, mut rx) = mpsc::channel::<Job>(capacity);
    let queue_id = queue_id.to_string();

    tokio::spawn(async move {
        tracing::debug!(queue_id = %queue_id, partition, "Partition worker started");
        while let Some(job) = rx.recv().await {
            let result = handler.handle(job.request).await;
            if job.reply.send(result).is_err() {
                tracing::debug!(queue_id = %queue_id, partition, "Caller gone before reply");
            }
        }
        tracing::debug!(queue_id = %queue_id, partition, "Partition worker stopped");
    });

    tx
}

/// Answers every request with a JSON description of what it received.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    async fn handle(&self, request: Request) -> Result<Response> {
        let body = json!({
            "method": request.method,
            "queue_id": request.queue_id,
            "partition_dividend": request.partition_dividend,
            "partition_number": request.partition_number,
            "resource": request.resource,
            "query": request.query,
            "body": String::from_utf8_lossy(&request.body),
        });
        Response::json(&body).map_err(|e| QueueError::backend(500, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shardgate_core::Route;

    use crate::types::Method;

    struct Tagged(u32);

    #[async_trait]
    impl Handler for Tagged {
        async fn handle(&self, _request: Request) -> Result<Response> {
            Ok(Response::new(200, self.0.to_string()))
        }
    }

    fn partitioned_request(dividend: u64, partition: u32) -> Request {
        let route = Route::Partitioned {
            queue_id: QueueId::new("air-bo", 4),
            dividend,
            partition,
            resource: dividend.to_string(),
        };
        Request::for_route(Method::Get, &route)
    }

    #[tokio::test]
    async fn routes_to_the_partition_worker() {
        let queues = LocalQueues::builder()
            .partitioned(
                QueueId::new("air-bo", 4),
                Box::new(|partition| Arc::new(Tagged(partition)) as Arc<dyn Handler>),
            )
            .build();

        assert_eq!(queues.worker_count(&QueueId::new("air-bo", 4)), 4);
        for partition in 0..4 {
            let resp = queues
                .invoke(partitioned_request(u64::from(partition) + 4, partition))
                .await
                .unwrap();
            assert_eq!(resp.payload, partition.to_string().into_bytes());
        }
    }

    #[tokio::test]
    async fn unknown_queue_has_no_handler() {
        let queues = LocalQueues::builder().build();
        let err = queues.invoke(partitioned_request(1, 1)).await.unwrap_err();
        assert!(matches!(err, QueueError::NoHandler(id) if id == "air-bo:4"));
    }

    #[tokio::test]
    async fn no_party_queue_is_keyed_with_zero() {
        let queues = LocalQueues::builder()
            .no_party("manifest", Arc::new(EchoHandler))
            .build();
        assert_eq!(queues.queue_ids(), vec![&QueueId::new("manifest", 0)]);

        let route = Route::NoParty {
            queue_id: QueueId::new("manifest", 0),
            resource: "list".to_string(),
        };
        let request = Request::for_route(Method::Post, &route).with_body(b"payload".to_vec());
        let resp = queues.invoke(request).await.unwrap();

        let body: serde_json::Value = serde_json::from_slice(&resp.payload).unwrap();
        assert_eq!(body["queue_id"], "manifest:0");
        assert_eq!(body["resource"], "list");
        assert_eq!(body["method"], "POST");
        assert_eq!(body["body"], "payload");
    }

    #[tokio::test]
    async fn handler_errors_are_returned() {
        struct Failing;

        #[async_trait]
        impl Handler for Failing {
            async fn handle(&self, _request: Request) -> Result<Response> {
                Err(QueueError::backend(422, "unprocessable"))
            }
        }

        let queues = LocalQueues::builder()
            .no_party("manifest", Arc::new(Failing))
            .build();
        let route = Route::NoParty {
            queue_id: QueueId::new("manifest", 0),
            resource: String::new(),
        };
        let err = queues
            .invoke(Request::for_route(Method::Get, &route))
            .await
            .unwrap_err();
        assert_eq!(err.http_status_code(), 422);
    }
}
