//! Shepherd kubehub: the request seam between typed clients and the cluster API.

#![forbid(unsafe_code)]

use std::fmt;

use async_trait::async_trait;
use http;
use kube::Client;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info};

mod memory;

pub use memory::{MemoryTransport, RecordedRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// The verbs the shepherd client issues; anything else is `None`.
    pub fn from_http(method: &http::Method) -> Option<Method> {
        match *method {
            http::Method::GET => Some(Method::Get),
            http::Method::POST => Some(Method::Post),
            http::Method::PUT => Some(Method::Put),
            http::Method::DELETE => Some(Method::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("api error {code}: {message}")]
    Api { code: u16, message: String },
    #[error("kube: {0}")]
    Kube(#[from] kube::Error),
    #[error("unsupported method {0}")]
    Method(String),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Send one prepared request to the cluster API and hand back the decoded
/// JSON body.
///
/// Requests are built with `kube::core::Request`, so paths, query
/// parameters and bodies are already encoded. `Ok(None)` means the API
/// answered 404; every other non-success status is an error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: http::Request<Vec<u8>>) -> Result<Option<Value>, TransportError>;
}

static KUBE_CLIENT: OnceCell<Client> = OnceCell::const_new();

/// Shared kube client, inferred from kubeconfig or the in-cluster
/// environment on first use.
pub async fn get_kube_client() -> Result<Client, TransportError> {
    let client = KUBE_CLIENT
        .get_or_try_init(|| async {
            let c = Client::try_default().await?;
            info!(ns = %c.default_namespace(), "kube client ready");
            Ok::<_, kube::Error>(c)
        })
        .await?;
    Ok(client.clone())
}

/// [`Transport`] over a live cluster connection.
#[derive(Clone)]
pub struct KubeTransport {
    client: Client,
}

impl KubeTransport {
    pub fn new(client: Client) -> Self { Self { client } }

    pub async fn try_default() -> Result<Self, TransportError> {
        Ok(Self::new(get_kube_client().await?))
    }

    pub fn default_namespace(&self) -> &str { self.client.default_namespace() }
}

#[async_trait]
impl Transport for KubeTransport {
    async fn send(&self, request: http::Request<Vec<u8>>) -> Result<Option<Value>, TransportError> {
        debug!(method = %request.method(), uri = %request.uri(), "kube request");
        match self.client.request::<Value>(request).await {
            Ok(v) => Ok(Some(v)),
            Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(None),
            Err(kube::Error::Api(ae)) => Err(TransportError::Api { code: ae.code, message: ae.message }),
            Err(e) => Err(e.into()),
        }
    }
}
