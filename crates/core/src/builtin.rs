//! Built-in Kubernetes/OpenShift kinds managed by this client.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::meta::{HasMeta, ObjectMeta};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigMap {
    pub meta: ObjectMeta,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl ConfigMap {
    pub fn new(name: impl Into<String>) -> Self {
        Self { meta: ObjectMeta::named(name), ..Default::default() }
    }

    pub fn set_data_key(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }
}

/// OpenShift route exposing a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub meta: ObjectMeta,
    pub host: String,
    pub path: String,
    pub insecure_edge_termination_policy: String,
    pub termination: String,
    pub to_kind: String,
    pub to_name: String,
    pub to_weight: i64,
    pub wildcard_policy: String,
}

impl Default for Route {
    fn default() -> Self {
        Self {
            meta: ObjectMeta::default(),
            host: String::new(),
            path: String::new(),
            insecure_edge_termination_policy: "Redirect".to_string(),
            termination: "edge".to_string(),
            to_kind: "Service".to_string(),
            to_name: String::new(),
            to_weight: 100,
            wildcard_policy: "None".to_string(),
        }
    }
}

impl Route {
    pub fn new(name: impl Into<String>, host: impl Into<String>, service: impl Into<String>) -> Self {
        Self { meta: ObjectMeta::named(name), host: host.into(), to_name: service.into(), ..Default::default() }
    }
}

/// Ingress policy admitting pods matching `ingress_match_labels` on one TCP port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPolicy {
    pub meta: ObjectMeta,
    pub port: i64,
    #[serde(default)]
    pub ingress_match_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub pod_selector_match_labels: BTreeMap<String, String>,
}

impl NetworkPolicy {
    pub fn new(name: impl Into<String>, port: i64) -> Self {
        Self { meta: ObjectMeta::named(name), port, ..Default::default() }
    }
}

/// Horizontal pod autoscaler targeting the deployment config of the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hpa {
    pub meta: ObjectMeta,
    pub min_replicas: i64,
    pub max_replicas: i64,
    pub target_cpu: i64,
}

impl Hpa {
    pub fn new(name: impl Into<String>, min_replicas: i64, max_replicas: i64, target_cpu: i64) -> Self {
        Self { meta: ObjectMeta::named(name), min_replicas, max_replicas, target_cpu }
    }
}

/// A stateful set. Only `replicas` and `serviceName` are modelled; the rest
/// of `.spec` is carried verbatim so updates do not drop it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatefulSet {
    pub meta: ObjectMeta,
    pub replicas: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_name: String,
    #[serde(default)]
    pub spec: Map<String, Value>,
}

impl StatefulSet {
    pub fn new(name: impl Into<String>, replicas: i64) -> Self {
        Self { meta: ObjectMeta::named(name), replicas, ..Default::default() }
    }
}

macro_rules! has_meta {
    ($($ty:ty),+) => {
        $(impl HasMeta for $ty {
            fn meta(&self) -> &ObjectMeta { &self.meta }
            fn meta_mut(&mut self) -> &mut ObjectMeta { &mut self.meta }
        })+
    };
}

has_meta!(ConfigMap, Route, NetworkPolicy, Hpa, StatefulSet);
