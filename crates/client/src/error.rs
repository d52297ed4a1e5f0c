use shepherd_core::ResourceKind;
use shepherd_kubehub::TransportError;
use shepherd_serializer::SerializerError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Serializer(#[from] SerializerError),
    #[error("building request: {0}")]
    Request(#[from] kube::core::request::Error),
    #[error("encoding request body: {0}")]
    Json(#[from] serde_json::Error),
    /// A write or list request answered 404.
    #[error("{kind} {name} not found")]
    NotFound { kind: ResourceKind, name: String },
}

pub type ClientResult<T> = Result<T, ClientError>;
