//! Normalized requests and responses exchanged with queue backends.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use shardgate_core::{QueueId, Route};

/// Request methods a queue accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
}

impl Method {
    /// The HTTP verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            other => Err(format!("unsupported method: {other}")),
        }
    }
}

/// Query parameters, preserving repeated keys in arrival order.
pub type QueryMap = BTreeMap<String, Vec<String>>;

/// A transport-agnostic request for a queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Request method.
    pub method: Method,
    /// Target queue, `alias:partitions`.
    pub queue_id: QueueId,
    /// Caller-supplied dividend, `0` for no-party queues.
    pub partition_dividend: u64,
    /// Shard index in `[0, partitions)`.
    pub partition_number: u32,
    /// `dividend[/resource_name[/resource_id]]` or the no-party resource.
    pub resource: String,
    /// Query parameters.
    #[serde(default)]
    pub query: QueryMap,
    /// Raw request body.
    #[serde(default, with = "base64_bytes")]
    pub body: Vec<u8>,
    /// Named side-channel values.
    #[serde(default)]
    pub attachments: BTreeMap<String, String>,
}

impl Request {
    /// Build a request for a resolved route with an empty query and body.
    #[must_use]
    pub fn for_route(method: Method, route: &Route) -> Self {
        Self {
            method,
            queue_id: route.queue_id().clone(),
            partition_dividend: route.dividend(),
            partition_number: route.partition(),
            resource: route.resource().to_string(),
            query: QueryMap::new(),
            body: Vec::new(),
            attachments: BTreeMap::new(),
        }
    }

    /// Replace the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: QueryMap) -> Self {
        self.query = query;
        self
    }

    /// Replace the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Add an attachment.
    #[must_use]
    pub fn with_attachment(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attachments.insert(key.into(), value.into());
        self
    }
}

/// A backend's reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code to answer with.
    pub status_code: u16,
    /// Body bytes, written verbatim.
    pub payload: Vec<u8>,
    /// Content type of `payload`, if known.
    pub content_type: Option<String>,
}

impl Response {
    /// A response with the given status and payload.
    #[must_use]
    pub fn new(status_code: u16, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            status_code,
            payload: payload.into(),
            content_type: None,
        }
    }

    /// A `200` response carrying `value` as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` does not serialize.
    pub fn json<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        let payload = serde_json::to_vec(value)?;
        Ok(Self::new(200, payload).with_content_type("application/json"))
    }

    /// Set the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Bodies travel base64-encoded so arbitrary bytes survive JSON transports.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
