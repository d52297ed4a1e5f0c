use serde_json::{json, Value};
use shepherd_core::{Hpa, Resource, ResourceKind};

use super::{mismatch, Normalizer};
use crate::doc::{encode_meta, header, Reader};
use crate::error::SerializerResult;
use crate::Serializer;

pub struct HpaNormalizer;

impl Normalizer for HpaNormalizer {
    fn supported(&self) -> &[ResourceKind] { &[ResourceKind::Hpa] }

    fn decode(&self, doc: &Value, kind: ResourceKind, _serializer: &Serializer) -> SerializerResult<Resource> {
        let r = Reader::new(doc, kind)?;
        let hpa = Hpa {
            meta: r.meta()?,
            min_replicas: r.optional_i64("/spec/minReplicas", 1)?,
            max_replicas: r.required_i64("/spec/maxReplicas")?,
            target_cpu: r.optional_i64("/spec/targetCPUUtilizationPercentage", 0)?,
        };
        Ok(hpa.into())
    }

    fn encode(&self, resource: &Resource, _serializer: &Serializer) -> SerializerResult<Value> {
        let Resource::Hpa(hpa) = resource else {
            return Err(mismatch(ResourceKind::Hpa, resource));
        };
        // the autoscaler always targets the deployment config sharing its name
        let spec = json!({
            "minReplicas": hpa.min_replicas,
            "maxReplicas": hpa.max_replicas,
            "scaleTargetRef": {
                "apiVersion": "apps.openshift.io/v1",
                "kind": "DeploymentConfig",
                "name": hpa.meta.name
            },
            "targetCPUUtilizationPercentage": hpa.target_cpu
        });
        let mut doc = header(ResourceKind::Hpa);
        doc.insert("metadata".into(), encode_meta(&hpa.meta));
        doc.insert("spec".into(), spec);
        Ok(Value::Object(doc))
    }
}
