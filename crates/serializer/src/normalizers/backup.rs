use serde_json::Value;
use shepherd_core::{Backup, BackupStatus, Resource, ResourceKind};

use super::backup_source::{decode_source, encode_source};
use super::{mismatch, Normalizer};
use crate::doc::{encode_meta, header, Reader, StatusWriter};
use crate::error::SerializerResult;
use crate::Serializer;

pub struct BackupNormalizer;

impl Normalizer for BackupNormalizer {
    fn supported(&self) -> &[ResourceKind] { &[ResourceKind::Backup] }

    fn decode(&self, doc: &Value, kind: ResourceKind, _serializer: &Serializer) -> SerializerResult<Resource> {
        let r = Reader::new(doc, kind)?;
        let backup = Backup {
            meta: r.meta()?,
            status: BackupStatus {
                phase: r.phase("/status/phase")?,
                start_timestamp: r.optional_str("/status/startTime")?,
                completion_timestamp: r.optional_str("/status/completionTime")?,
            },
            source: decode_source(&r.nested("/spec")?)?,
            restic_id: r.optional_str("/status/resticId")?,
        };
        Ok(Resource::Backup(backup))
    }

    fn encode(&self, resource: &Resource, _serializer: &Serializer) -> SerializerResult<Value> {
        let Resource::Backup(b) = resource else {
            return Err(mismatch(ResourceKind::Backup, resource));
        };
        let mut doc = header(ResourceKind::Backup);
        doc.insert("metadata".into(), encode_meta(&b.meta));
        doc.insert("spec".into(), Value::Object(encode_source(&b.source)));
        let status = StatusWriter::default()
            .phase("phase", b.status.phase.as_ref())
            .str("startTime", &b.status.start_timestamp)
            .str("completionTime", &b.status.completion_timestamp)
            .str("resticId", &b.restic_id)
            .finish();
        if let Some(status) = status {
            doc.insert("status".into(), status);
        }
        Ok(Value::Object(doc))
    }
}
