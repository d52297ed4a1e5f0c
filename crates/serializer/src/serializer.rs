use std::time::Instant;

use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use serde_json::Value;
use shepherd_core::{Backup, Kinded, Resource, ResourceKind, Restore, Sync};
use tracing::{debug, warn};

use crate::error::{DecodeError, SerializerError, SerializerResult};
use crate::normalizers::{
    BackupNormalizer, ConfigMapNormalizer, HpaNormalizer, ListNormalizer, NetworkPolicyNormalizer, Normalizer,
    RestoreNormalizer, RouteNormalizer, ScheduledBackupNormalizer, StatefulSetNormalizer, SyncNormalizer,
};

/// Dispatches decode/encode calls to the first registered normalizer that
/// supports the requested kind. Read-only once built; share it freely.
pub struct Serializer {
    normalizers: Vec<Box<dyn Normalizer>>,
}

impl std::fmt::Debug for Serializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Serializer").field("kinds", &self.kinds()).finish()
    }
}

impl Serializer {
    /// Build a registry, rejecting any kind claimed by two normalizers.
    pub fn new(normalizers: Vec<Box<dyn Normalizer>>) -> SerializerResult<Self> {
        let mut seen: Vec<ResourceKind> = Vec::new();
        for n in &normalizers {
            for &kind in n.supported() {
                if seen.contains(&kind) {
                    return Err(SerializerError::DuplicateNormalizer(kind));
                }
                seen.push(kind);
            }
        }
        Ok(Self { normalizers })
    }

    pub fn normalizer_for(&self, kind: ResourceKind) -> Option<&dyn Normalizer> {
        self.normalizers.iter().find(|n| n.supports(kind)).map(|n| n.as_ref())
    }

    pub fn supports(&self, kind: ResourceKind) -> bool { self.normalizer_for(kind).is_some() }

    /// Kinds covered by this registry, in registration order.
    pub fn kinds(&self) -> Vec<ResourceKind> {
        self.normalizers.iter().flat_map(|n| n.supported().iter().copied()).collect()
    }

    /// Decode `doc` as `kind`. A `kind` field in the document, when present,
    /// must name the same kind.
    pub fn decode(&self, doc: &Value, kind: ResourceKind) -> SerializerResult<Resource> {
        let normalizer = self.normalizer_for(kind).ok_or(SerializerError::UnsupportedType(kind))?;
        if let Some(found) = doc.get("kind").and_then(|v| v.as_str()) {
            if ResourceKind::from_wire_kind(found) != Some(kind) {
                counter!("serializer_decode_err", 1u64, "kind" => kind.kind());
                return Err(DecodeError::KindMismatch { expected: kind, found: found.to_string() }.into());
            }
        }
        let started = Instant::now();
        let out = normalizer.decode(doc, kind, self);
        histogram!("serializer_decode_ms", started.elapsed().as_secs_f64() * 1000.0);
        match &out {
            Ok(r) => {
                counter!("serializer_decode_total", 1u64, "kind" => kind.kind());
                debug!(kind = %kind, name = r.name().unwrap_or("-"), "decoded");
            }
            Err(e) => {
                counter!("serializer_decode_err", 1u64, "kind" => kind.kind());
                warn!(kind = %kind, error = %e, "decode failed");
            }
        }
        out
    }

    /// Decode a document whose kind is taken from its own `kind` field.
    pub fn decode_any(&self, doc: &Value) -> SerializerResult<Resource> {
        let kind = match doc.get("kind") {
            Some(Value::String(s)) => {
                ResourceKind::from_wire_kind(s).ok_or_else(|| DecodeError::UnknownKind(s.clone()))?
            }
            Some(other) => return Err(DecodeError::UnknownKind(other.to_string()).into()),
            None => return Err(DecodeError::UnknownKind(String::from("<none>")).into()),
        };
        self.decode(doc, kind)
    }

    /// Typed decode: `serializer.decode_as::<Backup>(&doc)`.
    pub fn decode_as<T: Kinded>(&self, doc: &Value) -> SerializerResult<T> {
        let resource = self.decode(doc, T::KIND)?;
        T::try_from(resource).map_err(|other| SerializerError::KindMismatch { expected: T::KIND, found: other.kind() })
    }

    pub fn encode(&self, resource: &Resource) -> SerializerResult<Value> {
        let kind = resource.kind();
        let normalizer = self.normalizer_for(kind).ok_or(SerializerError::UnsupportedType(kind))?;
        let doc = normalizer.encode(resource, self)?;
        counter!("serializer_encode_total", 1u64, "kind" => kind.kind());
        Ok(doc)
    }

    pub fn encode_value<T: Kinded + Clone>(&self, value: &T) -> SerializerResult<Value> {
        self.encode(&value.clone().into())
    }

    /// Compact JSON body for a write request.
    pub fn to_json_string(&self, resource: &Resource) -> SerializerResult<String> {
        Ok(serde_json::to_string(&self.encode(resource)?)?)
    }

    pub fn from_json_str(&self, body: &str, kind: ResourceKind) -> SerializerResult<Resource> {
        let doc: Value = serde_json::from_str(body)?;
        self.decode(&doc, kind)
    }
}

/// Wires every built-in normalizer into one [`Serializer`].
pub struct SerializerFactory;

impl SerializerFactory {
    /// The built-in normalizers, one per kind.
    pub fn normalizers() -> Vec<Box<dyn Normalizer>> {
        vec![
            Box::new(BackupNormalizer),
            Box::new(ListNormalizer::<Backup>::new()),
            Box::new(RestoreNormalizer),
            Box::new(ListNormalizer::<Restore>::new()),
            Box::new(ScheduledBackupNormalizer),
            Box::new(SyncNormalizer),
            Box::new(ListNormalizer::<Sync>::new()),
            Box::new(ConfigMapNormalizer),
            Box::new(RouteNormalizer),
            Box::new(NetworkPolicyNormalizer),
            Box::new(HpaNormalizer),
            Box::new(StatefulSetNormalizer),
        ]
    }

    /// Registry of the built-in normalizers. Their kinds are disjoint, so the
    /// duplicate check is skipped here and covered by a unit test instead.
    pub fn create() -> Serializer {
        Serializer { normalizers: Self::normalizers() }
    }

    /// Process-wide registry, built on first use.
    pub fn shared() -> &'static Serializer {
        static SHARED: Lazy<Serializer> = Lazy::new(SerializerFactory::create);
        &SHARED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn built_in_registry_covers_every_kind_once() {
        let s = Serializer::new(SerializerFactory::normalizers()).unwrap();
        assert_eq!(s.kinds().len(), ResourceKind::ALL.len());
        for kind in ResourceKind::ALL {
            assert!(s.supports(kind), "{kind} not registered");
        }
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let err = Serializer::new(vec![Box::new(BackupNormalizer), Box::new(BackupNormalizer)]).unwrap_err();
        assert!(matches!(err, SerializerError::DuplicateNormalizer(ResourceKind::Backup)));
    }

    #[test]
    fn missing_normalizer_is_unsupported() {
        let s = Serializer::new(vec![Box::new(BackupNormalizer)]).unwrap();
        let err = s.encode(&Restore::new("r", "b").into()).unwrap_err();
        assert!(matches!(err, SerializerError::UnsupportedType(ResourceKind::Restore)));
        let err = s.decode(&json!({"metadata": {"name": "x"}}), ResourceKind::Hpa).unwrap_err();
        assert!(matches!(err, SerializerError::UnsupportedType(ResourceKind::Hpa)));
    }

    #[test]
    fn document_kind_must_match_request() {
        let doc = json!({"kind": "Restore", "metadata": {"name": "x"}, "spec": {"backupName": "b"}});
        let err = SerializerFactory::create().decode(&doc, ResourceKind::Backup).unwrap_err();
        assert!(matches!(err, SerializerError::Decode(DecodeError::KindMismatch { expected: ResourceKind::Backup, .. })));
    }

    #[test]
    fn decode_any_reads_kind_from_document() {
        let doc = json!({"kind": "BackupScheduled", "metadata": {"name": "s"}, "spec": {"schedule": {"crontab": "@hourly"}, "retention": {"maxNumber": 3}}});
        let r = SerializerFactory::shared().decode_any(&doc).unwrap();
        assert_eq!(r.kind(), ResourceKind::ScheduledBackup);
        assert_eq!(r.name(), Some("s"));

        let err = SerializerFactory::shared().decode_any(&json!({"kind": "Pod"})).unwrap_err();
        assert!(matches!(err, SerializerError::Decode(DecodeError::UnknownKind(k)) if k == "Pod"));
        assert!(SerializerFactory::shared().decode_any(&json!({"metadata": {}})).is_err());
    }

    #[test]
    fn json_string_round_trip() {
        let s = SerializerFactory::create();
        let body = s.to_json_string(&Backup::new("b1").into()).unwrap();
        assert!(body.starts_with(r#"{"apiVersion":"extension.shepherd/v1","kind":"Backup""#));
        let back = s.from_json_str(&body, ResourceKind::Backup).unwrap();
        assert_eq!(back, Resource::from(Backup::new("b1")));
    }

    #[test]
    fn decode_as_wrong_variant_is_a_mismatch() {
        let err = SerializerFactory::create().decode_as::<Restore>(&json!({"kind": "Backup", "metadata": {"name": "x"}})).unwrap_err();
        assert!(matches!(err, SerializerError::Decode(DecodeError::KindMismatch { .. })));
    }
}
