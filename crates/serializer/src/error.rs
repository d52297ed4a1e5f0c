use shepherd_core::ResourceKind;

/// A wire document could not be turned into the requested entity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("{kind}: missing required field {path}")]
    MissingField { kind: ResourceKind, path: String },
    #[error("{kind}: field {path} is not {expected}")]
    InvalidType { kind: ResourceKind, path: String, expected: &'static str },
    #[error("document kind {found} does not match requested {expected}")]
    KindMismatch { expected: ResourceKind, found: String },
    #[error("document has no recognised kind: {0}")]
    UnknownKind(String),
    #[error("{list}: item {index}: {source}")]
    Item {
        list: ResourceKind,
        index: usize,
        #[source]
        source: Box<DecodeError>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SerializerError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("no normalizer registered for {0}")]
    UnsupportedType(ResourceKind),
    #[error("more than one normalizer registered for {0}")]
    DuplicateNormalizer(ResourceKind),
    #[error("expected a {expected} but got a {found}")]
    KindMismatch { expected: ResourceKind, found: ResourceKind },
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SerializerResult<T> = Result<T, SerializerError>;
