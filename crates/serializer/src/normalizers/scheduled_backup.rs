use serde_json::{Map, Value};
use shepherd_core::{BackupStatus, Resource, ResourceKind, ScheduledBackup, DEFAULT_STARTING_DEADLINE_SECONDS};

use super::backup_source::{decode_source, encode_mysql, encode_volumes};
use super::{mismatch, Normalizer};
use crate::doc::{encode_meta, header, Reader, StatusWriter};
use crate::error::SerializerResult;
use crate::Serializer;

/// `BackupScheduled` documents nest retention as `{maxNumber}` and the
/// schedule as `{crontab, startingDeadlineSeconds}`.
pub struct ScheduledBackupNormalizer;

impl Normalizer for ScheduledBackupNormalizer {
    fn supported(&self) -> &[ResourceKind] { &[ResourceKind::ScheduledBackup] }

    fn decode(&self, doc: &Value, kind: ResourceKind, _serializer: &Serializer) -> SerializerResult<Resource> {
        let r = Reader::new(doc, kind)?;
        let schedule = ScheduledBackup {
            meta: r.meta()?,
            status: BackupStatus {
                phase: r.phase("/status/phase")?,
                start_timestamp: r.optional_str("/status/startTime")?,
                completion_timestamp: r.optional_str("/status/completionTime")?,
            },
            source: decode_source(&r.nested("/spec")?)?,
            schedule: r.required_str("/spec/schedule/crontab")?,
            retention: r.required_i64("/spec/retention/maxNumber")?,
            last_executed: r.optional_str("/status/lastExecutedTime")?,
            starting_deadline_seconds: r
                .optional_i64("/spec/schedule/startingDeadlineSeconds", DEFAULT_STARTING_DEADLINE_SECONDS)?,
        };
        Ok(Resource::ScheduledBackup(schedule))
    }

    fn encode(&self, resource: &Resource, _serializer: &Serializer) -> SerializerResult<Value> {
        let Resource::ScheduledBackup(s) = resource else {
            return Err(mismatch(ResourceKind::ScheduledBackup, resource));
        };
        let mut retention = Map::new();
        retention.insert("maxNumber".into(), Value::from(s.retention));
        let mut schedule = Map::new();
        schedule.insert("crontab".into(), Value::from(s.schedule.as_str()));
        schedule.insert("startingDeadlineSeconds".into(), Value::from(s.starting_deadline_seconds));

        let mut spec = Map::new();
        spec.insert("retention".into(), Value::Object(retention));
        spec.insert("schedule".into(), Value::Object(schedule));
        spec.insert("volumes".into(), encode_volumes(&s.source));
        spec.insert("mysql".into(), encode_mysql(&s.source));

        let mut doc = header(ResourceKind::ScheduledBackup);
        doc.insert("metadata".into(), encode_meta(&s.meta));
        doc.insert("spec".into(), Value::Object(spec));
        let status = StatusWriter::default()
            .phase("phase", s.status.phase.as_ref())
            .str("startTime", &s.status.start_timestamp)
            .str("completionTime", &s.status.completion_timestamp)
            .str("lastExecutedTime", &s.last_executed)
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

    #[test]
    fn encodes_nested_schedule_and_retention() {
        let mut s = ScheduledBackup::new("nightly", "0 2 * * *", 7);
        s.source.add_volume("shared", "pvc");
        let doc = SerializerFactory::create().encode(&s.into()).unwrap();
        assert_eq!(
            doc,
            json!({
                "apiVersion": "extension.shepherd/v1",
                "kind": "BackupScheduled",
                "metadata": {"name": "nightly"},
                "spec": {
                    "retention": {"maxNumber": 7},
                    "schedule": {"crontab": "0 2 * * *", "startingDeadlineSeconds": 3600},
                    "volumes": {"shared": {"claimName": "pvc"}},
                    "mysql": {}
                }
            })
        );
    }

    #[test]
    fn decodes_string_retention_and_default_deadline() {
        let doc = json!({
            "kind": "BackupScheduled",
            "metadata": {"name": "nightly"},
            "spec": {"retention": {"maxNumber": "5"}, "schedule": {"crontab": "@daily"}},
            "status": {"lastExecutedTime": "2024-02-02T02:00:00Z"}
        });
        let s: ScheduledBackup = SerializerFactory::create().decode_as(&doc).unwrap();
        assert_eq!(s.retention, 5);
        assert_eq!(s.schedule, "@daily");
        assert_eq!(s.starting_deadline_seconds, 3600);
        assert_eq!(s.last_executed, "2024-02-02T02:00:00Z");
    }

    #[test]
    fn crontab_is_required() {
        let doc = json!({"metadata": {"name": "x"}, "spec": {"retention": {"maxNumber": 1}}});
        assert!(SerializerFactory::create().decode(&doc, ResourceKind::ScheduledBackup).is_err());
    }
}
