//! `volumes` / `mysql` blocks shared by backups, restores, schedules and syncs.
//!
//! Volumes travel as `{id: {claimName}}`. Databases travel as a mapping keyed
//! by database id (`{id: {secret: {name, keys}}}`) but are held as an ordered
//! list, so they are re-keyed by id on encode.

use serde_json::{Map, Value};
use shepherd_core::{BackupSource, Database};
use tracing::warn;

use crate::doc::{escape_key, Reader};
use crate::error::DecodeError;

/// Decode `volumes` and `mysql` found under `reader`'s root.
pub(crate) fn decode_source(reader: &Reader<'_>) -> Result<BackupSource, DecodeError> {
    let mut source = BackupSource::default();

    if let Some(volumes) = reader.object("/volumes")? {
        for id in volumes.keys() {
            let claim = reader.required_str(&format!("/volumes/{}/claimName", escape_key(id)))?;
            source.add_volume(id.clone(), claim);
        }
    }

    if let Some(mysql) = reader.object("/mysql")? {
        for id in mysql.keys() {
            let base = format!("/mysql/{}/secret", escape_key(id));
            let secret_name = reader.required_str(&format!("{}/name", base))?;
            let keys = reader.string_list(&format!("{}/keys", base))?;
            source.add_database(Database::new(id.clone(), secret_name, keys));
        }
    }

    Ok(source)
}

pub(crate) fn encode_volumes(source: &BackupSource) -> Value {
    let mut out = Map::new();
    for (id, claim) in &source.volumes {
        let mut entry = Map::new();
        entry.insert("claimName".into(), Value::from(claim.as_str()));
        out.insert(id.clone(), Value::Object(entry));
    }
    Value::Object(out)
}

pub(crate) fn encode_mysql(source: &BackupSource) -> Value {
    let mut out = Map::new();
    for db in &source.databases {
        debug_assert!(!db.id.is_empty(), "database without an id");
        let mut secret = Map::new();
        secret.insert("name".into(), Value::from(db.secret_name.as_str()));
        secret.insert(
            "keys".into(),
            Value::Array(db.secret_keys.iter().map(|k| Value::from(k.as_str())).collect()),
        );
        let mut entry = Map::new();
        entry.insert("secret".into(), Value::Object(secret));
        if out.insert(db.id.clone(), Value::Object(entry)).is_some() {
            warn!(id = %db.id, "duplicate database id; later entry wins");
        }
    }
    Value::Object(out)
}

/// `{volumes, mysql}` pair as nested under a spec.
pub(crate) fn encode_source(source: &BackupSource) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("volumes".into(), encode_volumes(source));
    out.insert("mysql".into(), encode_mysql(source));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shepherd_core::ResourceKind;

    #[test]
    fn databases_are_rekeyed_by_id() {
        let doc = json!({"spec": {"mysql": {"db1": {"secret": {"name": "s1", "keys": ["k1"]}}}}});
        let r = Reader::new(&doc, ResourceKind::Backup).unwrap();
        let src = decode_source(&r.nested("/spec").unwrap()).unwrap();
        assert_eq!(src.databases, vec![Database::new("db1", "s1", ["k1"])]);
        assert_eq!(encode_mysql(&src), json!({"db1": {"secret": {"name": "s1", "keys": ["k1"]}}}));
    }

    #[test]
    fn database_declaration_order_is_kept() {
        let doc = json!({"mysql": {
            "zeta": {"secret": {"name": "sz", "keys": []}},
            "alpha": {"secret": {"name": "sa", "keys": ["u", "p"]}}
        }});
        let r = Reader::new(&doc, ResourceKind::Backup).unwrap();
        let src = decode_source(&r).unwrap();
        let ids: Vec<_> = src.databases.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["zeta", "alpha"]);
        let keys: Vec<_> = encode_mysql(&src).as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn volume_without_claim_fails() {
        let doc = json!({"volumes": {"shared": {}}});
        let r = Reader::new(&doc, ResourceKind::Backup).unwrap();
        let err = decode_source(&r).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MissingField { kind: ResourceKind::Backup, path: "/volumes/shared/claimName".into() }
        );
    }

    #[test]
    fn volumes_encode_as_claim_entries() {
        let mut src = BackupSource::default();
        src.add_volume("shared", "pvc-1");
        assert_eq!(encode_volumes(&src), json!({"shared": {"claimName": "pvc-1"}}));
        assert_eq!(encode_volumes(&BackupSource::default()), json!({}));
    }

    #[test]
    fn duplicate_database_ids_collapse() {
        let mut src = BackupSource::default();
        src.add_database(Database::new("db", "first", ["a"]));
        src.add_database(Database::new("db", "second", ["b"]));
        assert_eq!(encode_mysql(&src), json!({"db": {"secret": {"name": "second", "keys": ["b"]}}}));
    }
}
