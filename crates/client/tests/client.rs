#![forbid(unsafe_code)]

use serde_json::json;
use shepherd_client::{ClientConfig, ClientError, ShepherdClient};
use shepherd_core::{
    Backup, BackupObject, ConfigMap, Hpa, Label, NetworkPolicy, Phase, Restore, Route, ScheduledBackup, SortOrder,
    StatefulSet, Sync,
};
use shepherd_kubehub::{Method, MemoryTransport, TransportError};

const NS: &str = "node-123";
const CRD: &str = "/apis/extension.shepherd/v1/namespaces/node-123";

fn client() -> ShepherdClient<MemoryTransport> {
    ShepherdClient::new(MemoryTransport::new(), ClientConfig::new(NS))
}

fn backup_doc(name: &str, ts: &str, phase: &str) -> serde_json::Value {
    json!({
        "apiVersion": "extension.shepherd/v1",
        "kind": "Backup",
        "metadata": {"name": name, "creationTimestamp": ts, "labels": {"site": "123"}},
        "spec": {"volumes": {}, "mysql": {}},
        "status": {"phase": phase}
    })
}

#[tokio::test]
async fn get_backup_decodes_or_reports_absent() {
    let c = client();
    c.transport().reply(
        Method::Get,
        format!("{CRD}/backups/b1"),
        Some(backup_doc("b1", "2024-01-01T00:00:00Z", "InProgress")),
    );
    let b = c.get_backup("b1").await.unwrap().unwrap();
    assert_eq!(b.friendly_phase(), "In Progress");
    assert!(c.get_backup("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn list_backup_passes_label_selector() {
    let c = client();
    c.transport().reply(
        Method::Get,
        format!("{CRD}/backups"),
        Some(json!({
            "apiVersion": "extension.shepherd/v1",
            "kind": "BackupList",
            "items": [
                backup_doc("old", "2024-01-01T00:00:00Z", "Completed"),
                backup_doc("new", "2024-03-01T00:00:00Z", "New")
            ]
        })),
    );
    let list = c.list_backup(Some(&Label::new("site", "123"))).await.unwrap();
    let names: Vec<_> = list.backups_by_created_time(SortOrder::Desc).iter().map(|b| b.meta.name.clone()).collect();
    assert_eq!(names, ["new", "old"]);

    let req = c.transport().last_request().unwrap();
    assert_eq!(req.path, format!("{CRD}/backups"));
    assert!(req.has_query("labelSelector=site%3D123"));
}

#[tokio::test]
async fn create_backup_posts_write_payload() {
    let c = client();
    let mut b = Backup::new("b2");
    b.source.add_volume("shared", "node-123-shared");
    b.set_friendly_name("pre-deploy");
    let created = c.create_backup(&b).await.unwrap();
    assert_eq!(created, b);

    let req = c.transport().last_request().unwrap();
    assert_eq!(req.method, Method::Post);
    assert_eq!(req.path, format!("{CRD}/backups"));
    let body = req.body.unwrap();
    assert_eq!(body["kind"], "Backup");
    assert_eq!(body["metadata"]["annotations"]["backups.shepherd/friendly-name"], "pre-deploy");
    assert!(body.get("status").is_none());
}

#[tokio::test]
async fn update_and_delete_backup() {
    let c = client();
    let mut b = Backup::new("b3");
    b.status.phase = Some(Phase::Completed);
    c.update_backup(&b).await.unwrap();
    assert_eq!(c.transport().last_request().unwrap().path, format!("{CRD}/backups/b3"));

    assert!(c.delete_backup("b3").await.unwrap());
    let req = c.transport().last_request().unwrap();
    assert_eq!(req.method, Method::Delete);
    assert!(req.body.map_or(true, |b| b.get("propagationPolicy").is_none()));
}

#[tokio::test]
async fn update_echoes_resource_version() {
    let c = client();
    let mut doc = backup_doc("b4", "2024-01-01T00:00:00Z", "Completed");
    doc["metadata"]["resourceVersion"] = json!("771");
    c.transport().reply(Method::Get, format!("{CRD}/backups/b4"), Some(doc));

    let mut fetched = c.get_backup("b4").await.unwrap().unwrap();
    assert_eq!(fetched.meta.resource_version, "771");
    fetched.set_friendly_name("kept");
    c.update_backup(&fetched).await.unwrap();

    let req = c.transport().last_request().unwrap();
    assert_eq!(req.method, Method::Put);
    assert_eq!(req.body.unwrap()["metadata"]["resourceVersion"], "771");

    c.create_backup(&Backup::new("fresh")).await.unwrap();
    let body = c.transport().last_request().unwrap().body.unwrap();
    assert!(body["metadata"].get("resourceVersion").is_none());
}

#[tokio::test]
async fn schedule_delete_propagation() {
    let c = client();
    c.delete_schedule("nightly", true).await.unwrap();
    let req = c.transport().last_request().unwrap();
    assert_eq!(req.path, format!("{CRD}/backupscheduleds/nightly"));
    assert_eq!(req.body.unwrap()["propagationPolicy"], "Foreground");

    c.delete_schedule("nightly", false).await.unwrap();
    assert_eq!(c.transport().last_request().unwrap().body.unwrap()["propagationPolicy"], "Orphan");
}

#[tokio::test]
async fn delete_of_missing_object_is_false() {
    let c = client();
    c.transport().reply(Method::Delete, format!("{CRD}/backups/gone"), None);
    assert!(!c.delete_backup("gone").await.unwrap());
}

#[tokio::test]
async fn schedule_create_and_update() {
    let c = client();
    let s = ScheduledBackup::new("nightly", "0 3 * * *", 5);
    assert_eq!(c.create_schedule(&s).await.unwrap(), s);
    let body = c.transport().last_request().unwrap().body.unwrap();
    assert_eq!(body["spec"]["schedule"]["crontab"], "0 3 * * *");
    assert_eq!(body["spec"]["retention"]["maxNumber"], 5);

    c.transport().reply(Method::Get, format!("{CRD}/backupscheduleds/nightly"), Some(body));
    let mut fetched = c.get_schedule("nightly").await.unwrap().unwrap();
    fetched.retention = 9;
    assert_eq!(c.update_schedule(&fetched).await.unwrap().retention, 9);
}

#[tokio::test]
async fn restores_and_syncs() {
    let c = client();
    let r = Restore::new("r1", "b1");
    assert_eq!(c.create_restore(&r).await.unwrap(), r);
    assert_eq!(c.transport().last_request().unwrap().path, format!("{CRD}/restores"));

    c.transport().reply(Method::Get, format!("{CRD}/restores"), Some(json!({"items": []})));
    assert!(!c.list_restore(None).await.unwrap().has_restores());
    let req = c.transport().last_request().unwrap();
    assert!(req.query.as_deref().map_or(true, |q| !q.contains("labelSelector")));

    let s = Sync::new("sync-1", "123", "prod", "dev");
    assert_eq!(c.create_sync(&s).await.unwrap(), s);
    assert!(c.get_sync("sync-1").await.unwrap().is_none());
    c.transport().reply(Method::Get, format!("{CRD}/syncs"), Some(json!({"items": [sync_doc()]})));
    assert_eq!(c.list_sync(None).await.unwrap().sync_count(), 1);
}

fn sync_doc() -> serde_json::Value {
    json!({
        "kind": "Sync",
        "metadata": {"name": "sync-1"},
        "spec": {"site": "123", "backupEnv": "prod", "restoreEnv": "dev"}
    })
}

#[tokio::test]
async fn list_404_is_an_error() {
    let c = client();
    let err = c.list_backup(None).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound { .. }));
}

#[tokio::test]
async fn built_in_kinds() {
    let c = client();

    let mut cm = ConfigMap::new("settings");
    cm.set_data_key("A", "1");
    c.update_configmap(&cm).await.unwrap();
    assert_eq!(c.transport().last_request().unwrap().path, "/api/v1/namespaces/node-123/configmaps/settings");
    assert!(c.get_configmap("settings").await.unwrap().is_none());

    let np = NetworkPolicy::new("allow", 8080);
    assert_eq!(c.create_networkpolicy(&np).await.unwrap(), np);
    assert!(c.get_networkpolicy("allow").await.unwrap().is_none());
    assert!(c.delete_networkpolicy("allow").await.unwrap());

    let hpa = Hpa::new("node-123", 1, 3, 70);
    assert_eq!(c.create_hpa(&hpa).await.unwrap(), hpa);
    assert_eq!(c.update_hpa(&hpa).await.unwrap(), hpa);
    assert!(c.get_hpa("node-123").await.unwrap().is_none());
    assert!(c.delete_hpa("node-123").await.unwrap());

    let mut route = Route::new("web", "node.example.com", "node-123");
    assert_eq!(c.create_route(&route).await.unwrap(), route);
    route.path = "/admin".into();
    assert_eq!(c.update_route(&route).await.unwrap(), route);
    let req = c.transport().last_request().unwrap();
    assert_eq!(req.method, Method::Put);
    assert_eq!(req.path, "/apis/route.openshift.io/v1/namespaces/node-123/routes/web");
    assert_eq!(req.body.unwrap()["spec"]["path"], "/admin");
    assert!(c.get_route("web").await.unwrap().is_none());
    assert!(c.delete_route("web").await.unwrap());

    let sts = StatefulSet::new("solr", 2);
    assert_eq!(c.update_statefulset(&sts).await.unwrap(), sts);
    assert!(c.get_statefulset("solr").await.unwrap().is_none());
}

#[tokio::test]
async fn api_errors_surface_as_transport_errors() {
    let c = client();
    c.transport().fail(Method::Post, format!("{CRD}/backups"), 409, "already exists");
    let err = c.create_backup(&Backup::new("dup")).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(TransportError::Api { code: 409, .. })));
}

#[tokio::test]
async fn malformed_reply_surfaces_as_serializer_error() {
    let c = client();
    c.transport().reply(Method::Get, format!("{CRD}/backups/bad"), Some(json!({"metadata": {}})));
    assert!(matches!(c.get_backup("bad").await.unwrap_err(), ClientError::Serializer(_)));
}
