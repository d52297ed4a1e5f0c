//! One normalizer per resource kind.

mod backup;
mod backup_source;
mod config_map;
mod hpa;
mod list;
mod network_policy;
mod restore;
mod route;
mod scheduled_backup;
mod stateful_set;
mod sync;

use serde_json::Value;
use shepherd_core::{Resource, ResourceKind};

use crate::error::{SerializerError, SerializerResult};
use crate::Serializer;

pub use backup::BackupNormalizer;
pub use config_map::ConfigMapNormalizer;
pub use hpa::HpaNormalizer;
pub use list::ListNormalizer;
pub use network_policy::NetworkPolicyNormalizer;
pub use restore::RestoreNormalizer;
pub use route::RouteNormalizer;
pub use scheduled_backup::ScheduledBackupNormalizer;
pub use stateful_set::StatefulSetNormalizer;
pub use sync::SyncNormalizer;

/// Converter between one (or a few) resource kinds and their wire documents.
///
/// Normalizers hold no mutable state. The dispatching [`Serializer`] is
/// passed in so list kinds can decode and encode their items through it.
pub trait Normalizer: Send + std::marker::Sync {
    /// Kinds this normalizer handles.
    fn supported(&self) -> &[ResourceKind];

    fn supports(&self, kind: ResourceKind) -> bool {
        self.supported().contains(&kind)
    }

    /// Build an entity of `kind` from `doc`. No partial entity is returned on error.
    fn decode(&self, doc: &Value, kind: ResourceKind, serializer: &Serializer) -> SerializerResult<Resource>;

    /// Build the wire document for `resource`. Same input, same output.
    fn encode(&self, resource: &Resource, serializer: &Serializer) -> SerializerResult<Value>;
}

/// Error for a resource handed to a normalizer that does not own its kind.
pub(crate) fn mismatch(expected: ResourceKind, resource: &Resource) -> SerializerError {
    SerializerError::KindMismatch { expected, found: resource.kind() }
}
