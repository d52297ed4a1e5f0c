//! Shepherd client: typed operations on backups, restores, schedules, syncs
//! and the built-in kinds they work alongside.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Instant;

use http;
use kube::core::params::{DeleteParams, GetParams, ListParams, PostParams, PropagationPolicy};
use kube::core::Request;
use metrics::{counter, histogram};
use serde_json::Value;
use shepherd_core::{
    Backup, BackupList, ConfigMap, HasMeta, Hpa, Kinded, Label, NetworkPolicy, ResourceKind, Restore, RestoreList,
    Route, ScheduledBackup, StatefulSet, Sync, SyncList,
};
use shepherd_kubehub::{Method, Transport};
use shepherd_serializer::{Serializer, SerializerFactory};
use tracing::{debug, warn};

mod config;
mod error;

pub use config::{ClientConfig, DEFAULT_API_GROUP, DEFAULT_NAMESPACE};
pub use error::{ClientError, ClientResult};

/// REST path prefix (`/api/v1` or `/apis/{group}/{version}`) serving `kind`.
fn api_prefix(kind: ResourceKind, api_group: &str) -> String {
    match kind {
        ResourceKind::Backup
        | ResourceKind::BackupList
        | ResourceKind::Restore
        | ResourceKind::RestoreList
        | ResourceKind::ScheduledBackup
        | ResourceKind::Sync
        | ResourceKind::SyncList => format!("/apis/{}/v1", api_group),
        ResourceKind::ConfigMap => "/api/v1".to_string(),
        ResourceKind::Route => "/apis/route.openshift.io/v1".to_string(),
        ResourceKind::NetworkPolicy => "/apis/networking.k8s.io/v1".to_string(),
        ResourceKind::Hpa => "/apis/autoscaling/v1".to_string(),
        ResourceKind::StatefulSet => "/apis/apps/v1".to_string(),
    }
}

/// Typed client over any [`Transport`].
pub struct ShepherdClient<T: Transport> {
    transport: T,
    config: ClientConfig,
    serializer: Arc<Serializer>,
}

impl<T: Transport> ShepherdClient<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self { transport, config, serializer: Arc::new(SerializerFactory::create()) }
    }

    pub fn with_serializer(mut self, serializer: Arc<Serializer>) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn config(&self) -> &ClientConfig { &self.config }

    pub fn transport(&self) -> &T { &self.transport }

    /// Collection path for `kind` in the configured namespace.
    pub fn collection_path(&self, kind: ResourceKind) -> String {
        let plural = kind.item_kind().unwrap_or(kind).plural();
        format!("{}/namespaces/{}/{}", api_prefix(kind, &self.config.api_group), self.config.namespace, plural)
    }

    pub fn object_path(&self, kind: ResourceKind, name: &str) -> String {
        format!("{}/{}", self.collection_path(kind), name)
    }

    fn request(&self, kind: ResourceKind) -> Request { Request::new(self.collection_path(kind)) }

    async fn send(&self, kind: ResourceKind, req: http::Request<Vec<u8>>) -> ClientResult<Option<Value>> {
        let method = Method::from_http(req.method()).map_or("OTHER", Method::as_str);
        let path = req.uri().path().to_string();
        let started = Instant::now();
        let out = self.transport.send(req).await;
        histogram!("client_request_ms", started.elapsed().as_secs_f64() * 1000.0);
        counter!("client_request_total", 1u64, "method" => method, "kind" => kind.kind());
        match &out {
            Ok(found) => debug!(method, %kind, path = %path, found = found.is_some(), "request done"),
            Err(e) => {
                counter!("client_request_err", 1u64, "method" => method, "kind" => kind.kind());
                warn!(method, %kind, path = %path, error = %e, "request failed");
            }
        }
        Ok(out?)
    }

    async fn get<K: Kinded>(&self, name: &str) -> ClientResult<Option<K>> {
        let req = self.request(K::KIND).get(name, &GetParams::default())?;
        match self.send(K::KIND, req).await? {
            Some(doc) => Ok(Some(self.serializer.decode_as(&doc)?)),
            None => Ok(None),
        }
    }

    async fn list<L: Kinded>(&self, selector: Option<&Label>) -> ClientResult<L> {
        let lp = match selector {
            Some(l) => ListParams::default().labels(&l.to_string()),
            None => ListParams::default(),
        };
        let req = self.request(L::KIND).list(&lp)?;
        match self.send(L::KIND, req).await? {
            Some(doc) => Ok(self.serializer.decode_as(&doc)?),
            None => Err(ClientError::NotFound { kind: L::KIND, name: self.collection_path(L::KIND) }),
        }
    }

    /// POST to the collection, or PUT to the object path when `replace`.
    async fn write<K: Kinded + HasMeta + Clone>(&self, obj: &K, replace: bool) -> ClientResult<K> {
        let body = serde_json::to_vec(&self.serializer.encode_value(obj)?)?;
        let pp = PostParams::default();
        let req = if replace {
            self.request(K::KIND).replace(obj.name(), &pp, body)?
        } else {
            self.request(K::KIND).create(&pp, body)?
        };
        match self.send(K::KIND, req).await? {
            Some(doc) => Ok(self.serializer.decode_as(&doc)?),
            None => Err(ClientError::NotFound { kind: K::KIND, name: obj.name().to_string() }),
        }
    }

    async fn create<K: Kinded + HasMeta + Clone>(&self, obj: &K) -> ClientResult<K> { self.write(obj, false).await }

    /// Replace `obj`. Its `resource_version`, when set, travels in the body
    /// so the API server can reject a stale write.
    async fn update<K: Kinded + HasMeta + Clone>(&self, obj: &K) -> ClientResult<K> { self.write(obj, true).await }

    /// `Ok(false)` when there was nothing to delete.
    async fn delete(
        &self,
        kind: ResourceKind,
        name: &str,
        propagation: Option<PropagationPolicy>,
    ) -> ClientResult<bool> {
        let dp = DeleteParams { propagation_policy: propagation, ..Default::default() };
        let req = self.request(kind).delete(name, &dp)?;
        Ok(self.send(kind, req).await?.is_some())
    }

    pub async fn get_backup(&self, name: &str) -> ClientResult<Option<Backup>> { self.get(name).await }

    pub async fn list_backup(&self, selector: Option<&Label>) -> ClientResult<BackupList> { self.list(selector).await }

    pub async fn create_backup(&self, backup: &Backup) -> ClientResult<Backup> { self.create(backup).await }

    pub async fn update_backup(&self, backup: &Backup) -> ClientResult<Backup> { self.update(backup).await }

    pub async fn delete_backup(&self, name: &str) -> ClientResult<bool> {
        self.delete(ResourceKind::Backup, name, None).await
    }

    pub async fn create_restore(&self, restore: &Restore) -> ClientResult<Restore> { self.create(restore).await }

    pub async fn list_restore(&self, selector: Option<&Label>) -> ClientResult<RestoreList> { self.list(selector).await }

    pub async fn get_schedule(&self, name: &str) -> ClientResult<Option<ScheduledBackup>> { self.get(name).await }

    pub async fn create_schedule(&self, schedule: &ScheduledBackup) -> ClientResult<ScheduledBackup> {
        self.create(schedule).await
    }

    pub async fn update_schedule(&self, schedule: &ScheduledBackup) -> ClientResult<ScheduledBackup> {
        self.update(schedule).await
    }

    /// Delete a schedule. With `cascade` the backups it created go too
    /// (foreground propagation); otherwise they are orphaned.
    pub async fn delete_schedule(&self, name: &str, cascade: bool) -> ClientResult<bool> {
        let policy = if cascade { PropagationPolicy::Foreground } else { PropagationPolicy::Orphan };
        self.delete(ResourceKind::ScheduledBackup, name, Some(policy)).await
    }

    pub async fn get_sync(&self, name: &str) -> ClientResult<Option<Sync>> { self.get(name).await }

    pub async fn list_sync(&self, selector: Option<&Label>) -> ClientResult<SyncList> { self.list(selector).await }

    pub async fn create_sync(&self, sync: &Sync) -> ClientResult<Sync> { self.create(sync).await }

    pub async fn get_configmap(&self, name: &str) -> ClientResult<Option<ConfigMap>> { self.get(name).await }

    pub async fn update_configmap(&self, cm: &ConfigMap) -> ClientResult<ConfigMap> { self.update(cm).await }

    pub async fn get_networkpolicy(&self, name: &str) -> ClientResult<Option<NetworkPolicy>> { self.get(name).await }

    pub async fn create_networkpolicy(&self, np: &NetworkPolicy) -> ClientResult<NetworkPolicy> { self.create(np).await }

    pub async fn delete_networkpolicy(&self, name: &str) -> ClientResult<bool> {
        self.delete(ResourceKind::NetworkPolicy, name, None).await
    }

    pub async fn get_statefulset(&self, name: &str) -> ClientResult<Option<StatefulSet>> { self.get(name).await }

    pub async fn update_statefulset(&self, sts: &StatefulSet) -> ClientResult<StatefulSet> { self.update(sts).await }

    pub async fn get_hpa(&self, name: &str) -> ClientResult<Option<Hpa>> { self.get(name).await }

    pub async fn create_hpa(&self, hpa: &Hpa) -> ClientResult<Hpa> { self.create(hpa).await }

    pub async fn update_hpa(&self, hpa: &Hpa) -> ClientResult<Hpa> { self.update(hpa).await }

    pub async fn delete_hpa(&self, name: &str) -> ClientResult<bool> { self.delete(ResourceKind::Hpa, name, None).await }

    pub async fn get_route(&self, name: &str) -> ClientResult<Option<Route>> { self.get(name).await }

    pub async fn create_route(&self, route: &Route) -> ClientResult<Route> { self.create(route).await }

    pub async fn update_route(&self, route: &Route) -> ClientResult<Route> { self.update(route).await }

    pub async fn delete_route(&self, name: &str) -> ClientResult<bool> {
        self.delete(ResourceKind::Route, name, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shepherd_kubehub::MemoryTransport;

    #[test]
    fn paths_follow_api_groups() {
        let c = ShepherdClient::new(MemoryTransport::new(), ClientConfig::new("site-1"));
        assert_eq!(c.collection_path(ResourceKind::Backup), "/apis/extension.shepherd/v1/namespaces/site-1/backups");
        assert_eq!(c.collection_path(ResourceKind::BackupList), "/apis/extension.shepherd/v1/namespaces/site-1/backups");
        assert_eq!(
            c.object_path(ResourceKind::ScheduledBackup, "nightly"),
            "/apis/extension.shepherd/v1/namespaces/site-1/backupscheduleds/nightly"
        );
        assert_eq!(c.object_path(ResourceKind::ConfigMap, "cfg"), "/api/v1/namespaces/site-1/configmaps/cfg");
        assert_eq!(c.collection_path(ResourceKind::Route), "/apis/route.openshift.io/v1/namespaces/site-1/routes");
        assert_eq!(
            c.collection_path(ResourceKind::Hpa),
            "/apis/autoscaling/v1/namespaces/site-1/horizontalpodautoscalers"
        );
        assert_eq!(c.collection_path(ResourceKind::StatefulSet), "/apis/apps/v1/namespaces/site-1/statefulsets");
        assert_eq!(
            c.collection_path(ResourceKind::NetworkPolicy),
            "/apis/networking.k8s.io/v1/namespaces/site-1/networkpolicies"
        );
    }

    #[test]
    fn custom_api_group() {
        let cfg = ClientConfig { namespace: "ns".into(), api_group: "backups.example.org".into() };
        let c = ShepherdClient::new(MemoryTransport::new(), cfg);
        assert_eq!(c.collection_path(ResourceKind::Sync), "/apis/backups.example.org/v1/namespaces/ns/syncs");
    }
}
