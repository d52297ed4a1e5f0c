use serde_json::{json, Value};
use shepherd_core::{NetworkPolicy, Resource, ResourceKind};

use super::{mismatch, Normalizer};
use crate::doc::{encode_meta, header, string_map_value, Reader};
use crate::error::SerializerResult;
use crate::Serializer;

/// Single-rule ingress policy: pods matching `podSelector` accept TCP on
/// one port from pods matching the ingress peer selector.
pub struct NetworkPolicyNormalizer;

const PEER_LABELS: &str = "/spec/ingress/0/from/0/podSelector/matchLabels";
const PORT: &str = "/spec/ingress/0/ports/0/port";

impl Normalizer for NetworkPolicyNormalizer {
    fn supported(&self) -> &[ResourceKind] { &[ResourceKind::NetworkPolicy] }

    fn decode(&self, doc: &Value, kind: ResourceKind, _serializer: &Serializer) -> SerializerResult<Resource> {
        let r = Reader::new(doc, kind)?;
        let np = NetworkPolicy {
            meta: r.meta()?,
            port: r.optional_i64(PORT, 0)?,
            ingress_match_labels: r.string_map(PEER_LABELS)?,
            pod_selector_match_labels: r.string_map("/spec/podSelector/matchLabels")?,
        };
        Ok(np.into())
    }

    fn encode(&self, resource: &Resource, _serializer: &Serializer) -> SerializerResult<Value> {
        let Resource::NetworkPolicy(np) = resource else {
            return Err(mismatch(ResourceKind::NetworkPolicy, resource));
        };
        let spec = json!({
            "ingress": [{
                "from": [{"podSelector": {"matchLabels": string_map_value(&np.ingress_match_labels)}}],
                "ports": [{"port": np.port, "protocol": "TCP"}]
            }],
            "podSelector": {"matchLabels": string_map_value(&np.pod_selector_match_labels)},
            "policyTypes": ["Ingress"]
        });
        let mut doc = header(ResourceKind::NetworkPolicy);
        doc.insert("metadata".into(), encode_meta(&np.meta));
        doc.insert("spec".into(), spec);
        Ok(Value::Object(doc))
    }
}
