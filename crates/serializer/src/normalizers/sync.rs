use serde_json::{Map, Value};
use shepherd_core::{BackupSource, Resource, ResourceKind, Sync};

use super::backup_source::{decode_source, encode_source};
use super::{mismatch, Normalizer};
use crate::doc::{encode_meta, header, Reader, StatusWriter};
use crate::error::{DecodeError, SerializerResult};
use crate::Serializer;

/// Syncs carry two independent `{volumes, mysql}` blocks under
/// `spec.backupSpec` and `spec.restoreSpec`, and a phase for each half.
pub struct SyncNormalizer;

/// An absent half decodes as empty.
fn decode_half(r: &Reader<'_>, path: &str) -> Result<BackupSource, DecodeError> {
    decode_source(&r.nested(path)?)
}

impl Normalizer for SyncNormalizer {
    fn supported(&self) -> &[ResourceKind] { &[ResourceKind::Sync] }

    fn decode(&self, doc: &Value, kind: ResourceKind, _serializer: &Serializer) -> SerializerResult<Resource> {
        let r = Reader::new(doc, kind)?;
        let sync = Sync {
            meta: r.meta()?,
            site: r.required_str("/spec/site")?,
            backup_env: r.required_str("/spec/backupEnv")?,
            restore_env: r.required_str("/spec/restoreEnv")?,
            backup_phase: r.phase("/status/backupPhase")?,
            restore_phase: r.phase("/status/restorePhase")?,
            start_timestamp: r.optional_str("/status/startTime")?,
            completion_timestamp: r.optional_str("/status/completionTime")?,
            backup: decode_half(&r, "/spec/backupSpec")?,
            restore: decode_half(&r, "/spec/restoreSpec")?,
        };
        Ok(Resource::Sync(sync))
    }

    fn encode(&self, resource: &Resource, _serializer: &Serializer) -> SerializerResult<Value> {
        let Resource::Sync(s) = resource else {
            return Err(mismatch(ResourceKind::Sync, resource));
        };
        let mut spec = Map::new();
        spec.insert("site".into(), Value::from(s.site.as_str()));
        spec.insert("backupEnv".into(), Value::from(s.backup_env.as_str()));
        spec.insert("restoreEnv".into(), Value::from(s.restore_env.as_str()));
        spec.insert("backupSpec".into(), Value::Object(encode_source(&s.backup)));
        spec.insert("restoreSpec".into(), Value::Object(encode_source(&s.restore)));

        let mut doc = header(ResourceKind::Sync);
        doc.insert("metadata".into(), encode_meta(&s.meta));
        doc.insert("spec".into(), Value::Object(spec));
        let status = StatusWriter::default()
            .phase("backupPhase", s.backup_phase.as_ref())
            .phase("restorePhase", s.restore_phase.as_ref())
            .str("startTime", &s.start_timestamp)
            .str("completionTime", &s.completion_timestamp)
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
    use crate::SerializerFactory;
    use serde_json::json;
    use shepherd_core::{Database, Phase};

    fn sync_doc() -> Value {
        json!({
            "apiVersion": "extension.shepherd/v1",
            "kind": "Sync",
            "metadata": {"name": "sync-1", "labels": {"site": "42"}, "creationTimestamp": "2024-04-04T04:04:04Z"},
            "spec": {
                "site": "42",
                "backupEnv": "prod",
                "restoreEnv": "uat",
                "backupSpec": {
                    "volumes": {"shared": {"claimName": "prod-shared"}},
                    "mysql": {"default": {"secret": {"name": "prod-db", "keys": ["user"]}}}
                },
                "restoreSpec": {
                    "volumes": {"shared": {"claimName": "uat-shared"}},
                    "mysql": []
                }
            },
            "status": {"backupPhase": "Completed", "restorePhase": "InProgress", "startTime": "2024-04-04T04:05:00Z"}
        })
    }

    #[test]
    fn decodes_both_halves_independently() {
        let s: Sync = SerializerFactory::create().decode_as(&sync_doc()).unwrap();
        assert_eq!(s.site, "42");
        assert_eq!(s.backup.volumes.get("shared").map(String::as_str), Some("prod-shared"));
        assert_eq!(s.restore.volumes.get("shared").map(String::as_str), Some("uat-shared"));
        assert_eq!(s.backup.databases, vec![Database::new("default", "prod-db", ["user"])]);
        assert!(s.restore.databases.is_empty());
        assert_eq!(s.backup_phase, Some(Phase::Completed));
        assert_eq!(s.restore_phase, Some(Phase::InProgress));
        assert!(!s.is_completed());
    }

    #[test]
    fn environments_are_required() {
        let mut doc = sync_doc();
        doc["spec"].as_object_mut().unwrap().remove("restoreEnv");
        assert!(SerializerFactory::create().decode(&doc, ResourceKind::Sync).is_err());
    }

    #[test]
    fn malformed_half_is_rejected() {
        let mut doc = sync_doc();
        doc["spec"]["backupSpec"] = json!("nope");
        assert!(SerializerFactory::create().decode(&doc, ResourceKind::Sync).is_err());
    }

    #[test]
    fn write_payload_has_both_specs() {
        let s = Sync::new("sync-2", "7", "prod", "dev");
        let doc = SerializerFactory::create().encode(&s.into()).unwrap();
        assert_eq!(
            doc["spec"],
            json!({
                "site": "7",
                "backupEnv": "prod",
                "restoreEnv": "dev",
                "backupSpec": {"volumes": {}, "mysql": {}},
                "restoreSpec": {"volumes": {}, "mysql": {}}
            })
        );
        assert!(doc.get("status").is_none());
    }
}
