use serde_json::Value;
use shepherd_core::{BackupStatus, Resource, ResourceKind, Restore};

use super::backup_source::{decode_source, encode_source};
use super::{mismatch, Normalizer};
use crate::doc::{encode_meta, header, Reader, StatusWriter};
use crate::error::SerializerResult;
use crate::Serializer;

/// Restores carry `spec.backupName` next to the usual volumes/mysql blocks.
pub struct RestoreNormalizer;

impl Normalizer for RestoreNormalizer {
    fn supported(&self) -> &[ResourceKind] { &[ResourceKind::Restore] }

    fn decode(&self, doc: &Value, kind: ResourceKind, _serializer: &Serializer) -> SerializerResult<Resource> {
        let r = Reader::new(doc, kind)?;
        let restore = Restore {
            meta: r.meta()?,
            status: BackupStatus {
                phase: r.phase("/status/phase")?,
                start_timestamp: r.optional_str("/status/startTime")?,
                completion_timestamp: r.optional_str("/status/completionTime")?,
            },
            source: decode_source(&r.nested("/spec")?)?,
            backup_name: r.required_str("/spec/backupName")?,
        };
        Ok(Resource::Restore(restore))
    }

    fn encode(&self, resource: &Resource, _serializer: &Serializer) -> SerializerResult<Value> {
        let Resource::Restore(rs) = resource else {
            return Err(mismatch(ResourceKind::Restore, resource));
        };
        let mut doc = header(ResourceKind::Restore);
        doc.insert("metadata".into(), encode_meta(&rs.meta));
        let mut spec = encode_source(&rs.source);
        spec.insert("backupName".into(), Value::from(rs.backup_name.as_str()));
        doc.insert("spec".into(), Value::Object(spec));
        let status = StatusWriter::default()
            .phase("phase", rs.status.phase.as_ref())
            .str("startTime", &rs.status.start_timestamp)
            .str("completionTime", &rs.status.completion_timestamp)
            .finish();
        if let Some(status) = status {
            doc.insert("status".into(), status);
        }
        Ok(Value::Object(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DecodeError, SerializerError, SerializerFactory};
    use serde_json::json;

    #[test]
    fn backup_name_is_required() {
        let doc = json!({"metadata": {"name": "r1"}, "spec": {}});
        let err = SerializerFactory::create().decode(&doc, ResourceKind::Restore).unwrap_err();
        match err {
            SerializerError::Decode(DecodeError::MissingField { kind, path }) => {
                assert_eq!(kind, ResourceKind::Restore);
                assert_eq!(path, "/spec/backupName");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn encodes_back_reference() {
        let r = Restore::new("r1", "b1");
        let doc = SerializerFactory::create().encode(&r.into()).unwrap();
        assert_eq!(doc["kind"], "Restore");
        assert_eq!(doc["spec"]["backupName"], "b1");
        assert_eq!(doc["spec"]["volumes"], json!({}));
        assert!(doc.get("status").is_none());
    }
}
