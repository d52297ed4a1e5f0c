use serde_json::Value;
use shepherd_core::{ConfigMap, Resource, ResourceKind};

use super::{mismatch, Normalizer};
use crate::doc::{encode_meta, header, Reader};
use crate::error::SerializerResult;
use crate::Serializer;

pub struct ConfigMapNormalizer;

impl Normalizer for ConfigMapNormalizer {
    fn supported(&self) -> &[ResourceKind] { &[ResourceKind::ConfigMap] }

    fn decode(&self, doc: &Value, kind: ResourceKind, _serializer: &Serializer) -> SerializerResult<Resource> {
        let r = Reader::new(doc, kind)?;
        let data = r.object("/data")?.cloned().unwrap_or_default();
        Ok(ConfigMap { meta: r.meta()?, data }.into())
    }

    fn encode(&self, resource: &Resource, _serializer: &Serializer) -> SerializerResult<Value> {
        let Resource::ConfigMap(cm) = resource else {
            return Err(mismatch(ResourceKind::ConfigMap, resource));
        };
        let mut doc = header(ResourceKind::ConfigMap);
        doc.insert("metadata".into(), encode_meta(&cm.meta));
        doc.insert("data".into(), Value::Object(cm.data.clone()));
        Ok(Value::Object(doc))
    }
}
