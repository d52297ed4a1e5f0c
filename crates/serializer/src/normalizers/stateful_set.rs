use serde_json::{Map, Value};
use shepherd_core::{Resource, ResourceKind, StatefulSet};

use super::{mismatch, Normalizer};
use crate::doc::{encode_meta, header, Reader};
use crate::error::SerializerResult;
use crate::Serializer;

/// Stateful sets are read-modify-write: everything in `spec` besides the
/// modelled fields is kept and written back untouched.
pub struct StatefulSetNormalizer;

const MODELLED: [&str; 2] = ["replicas", "serviceName"];

impl Normalizer for StatefulSetNormalizer {
    fn supported(&self) -> &[ResourceKind] { &[ResourceKind::StatefulSet] }

    fn decode(&self, doc: &Value, kind: ResourceKind, _serializer: &Serializer) -> SerializerResult<Resource> {
        let r = Reader::new(doc, kind)?;
        let spec: Map<String, Value> = r
            .object("/spec")?
            .map(|m| m.iter().filter(|(k, _)| !MODELLED.contains(&k.as_str())).map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        let sts = StatefulSet {
            meta: r.meta()?,
            replicas: r.optional_i64("/spec/replicas", 1)?,
            service_name: r.optional_str("/spec/serviceName")?,
            spec,
        };
        Ok(sts.into())
    }

    fn encode(&self, resource: &Resource, _serializer: &Serializer) -> SerializerResult<Value> {
        let Resource::StatefulSet(sts) = resource else {
            return Err(mismatch(ResourceKind::StatefulSet, resource));
        };
        let mut spec = Map::new();
        spec.insert("replicas".into(), Value::from(sts.replicas));
        if !sts.service_name.is_empty() {
            spec.insert("serviceName".into(), Value::from(sts.service_name.as_str()));
        }
        for (k, v) in &sts.spec {
            if !MODELLED.contains(&k.as_str()) {
                spec.insert(k.clone(), v.clone());
            }
        }
        let mut doc = header(ResourceKind::StatefulSet);
        doc.insert("metadata".into(), encode_meta(&sts.meta));
        doc.insert("spec".into(), Value::Object(spec));
        Ok(Value::Object(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SerializerFactory;
    use serde_json::json;

    #[test]
    fn unmodelled_spec_survives_update() {
        let doc = json!({
            "apiVersion": "apps/v1",
            "kind": "StatefulSet",
            "metadata": {"name": "solr"},
            "spec": {
                "replicas": 1,
                "serviceName": "solr-headless",
                "selector": {"matchLabels": {"app": "solr"}},
                "template": {"spec": {"containers": [{"name": "solr"}]}}
            }
        });
        let s = SerializerFactory::create();
        let mut sts: StatefulSet = s.decode_as(&doc).unwrap();
        assert!(!sts.spec.contains_key("replicas"));
        sts.replicas = 3;
        let out = s.encode(&sts.into()).unwrap();
        assert_eq!(out["spec"]["replicas"], 3);
        assert_eq!(out["spec"]["serviceName"], "solr-headless");
        assert_eq!(out["spec"]["selector"], doc["spec"]["selector"]);
        assert_eq!(out["spec"]["template"], doc["spec"]["template"]);
    }

    #[test]
    fn replicas_default_to_one() {
        let sts: StatefulSet = SerializerFactory::create().decode_as(&json!({"metadata": {"name": "x"}})).unwrap();
        assert_eq!(sts.replicas, 1);
        assert!(sts.spec.is_empty());
    }
}
