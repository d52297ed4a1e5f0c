use serde_json::{Map, Value};
use shepherd_core::{Resource, ResourceKind, Route};

use super::{mismatch, Normalizer};
use crate::doc::{encode_meta, header, Reader};
use crate::error::SerializerResult;
use crate::Serializer;

/// Edge-terminated route to a service. Fields absent from a document take
/// the [`Route`] defaults.
pub struct RouteNormalizer;

impl Normalizer for RouteNormalizer {
    fn supported(&self) -> &[ResourceKind] { &[ResourceKind::Route] }

    fn decode(&self, doc: &Value, kind: ResourceKind, _serializer: &Serializer) -> SerializerResult<Resource> {
        let r = Reader::new(doc, kind)?;
        let d = Route::default();
        let route = Route {
            meta: r.meta()?,
            host: r.optional_str("/spec/host")?,
            path: r.optional_str("/spec/path")?,
            insecure_edge_termination_policy: r
                .optional_str_or("/spec/tls/insecureEdgeTerminationPolicy", &d.insecure_edge_termination_policy)?,
            termination: r.optional_str_or("/spec/tls/termination", &d.termination)?,
            to_kind: r.optional_str_or("/spec/to/kind", &d.to_kind)?,
            to_name: r.required_str("/spec/to/name")?,
            to_weight: r.optional_i64("/spec/to/weight", d.to_weight)?,
            wildcard_policy: r.optional_str_or("/spec/wildcardPolicy", &d.wildcard_policy)?,
        };
        Ok(route.into())
    }

    fn encode(&self, resource: &Resource, _serializer: &Serializer) -> SerializerResult<Value> {
        let Resource::Route(rt) = resource else {
            return Err(mismatch(ResourceKind::Route, resource));
        };
        let mut tls = Map::new();
        tls.insert("insecureEdgeTerminationPolicy".into(), Value::from(rt.insecure_edge_termination_policy.as_str()));
        tls.insert("termination".into(), Value::from(rt.termination.as_str()));
        let mut to = Map::new();
        to.insert("kind".into(), Value::from(rt.to_kind.as_str()));
        to.insert("name".into(), Value::from(rt.to_name.as_str()));
        to.insert("weight".into(), Value::from(rt.to_weight));

        let mut spec = Map::new();
        spec.insert("host".into(), Value::from(rt.host.as_str()));
        spec.insert("path".into(), Value::from(rt.path.as_str()));
        spec.insert("tls".into(), Value::Object(tls));
        spec.insert("to".into(), Value::Object(to));
        spec.insert("wildcardPolicy".into(), Value::from(rt.wildcard_policy.as_str()));

        let mut doc = header(ResourceKind::Route);
        doc.insert("metadata".into(), encode_meta(&rt.meta));
        doc.insert("spec".into(), Value::Object(spec));
        Ok(Value::Object(doc))
    }
}
