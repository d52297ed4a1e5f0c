//! Backup, restore, schedule and sync entities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::meta::{HasMeta, ObjectMeta};
use crate::phase::{friendly_phase, Phase};

/// Annotation carrying a user-facing name for a backup-family object.
pub const FRIENDLY_NAME_ANNOTATION: &str = "backups.shepherd/friendly-name";

/// Default deadline for a scheduled backup to start, in seconds.
pub const DEFAULT_STARTING_DEADLINE_SECONDS: i64 = 3600;

/// One logical database backed by credentials held in a named secret.
///
/// `id` keys the entry under `spec.mysql` on the wire and must be unique
/// within its parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub id: String,
    pub secret_name: String,
    pub secret_keys: SmallVec<[String; 2]>,
}

impl Database {
    pub fn new<I, K>(id: impl Into<String>, secret_name: impl Into<String>, secret_keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            id: id.into(),
            secret_name: secret_name.into(),
            secret_keys: secret_keys.into_iter().map(Into::into).collect(),
        }
    }
}

/// Volumes (id -> claim name) and databases a backup-family object covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSource {
    #[serde(default)]
    pub volumes: BTreeMap<String, String>,
    #[serde(default)]
    pub databases: Vec<Database>,
}

impl BackupSource {
    pub fn add_volume(&mut self, id: impl Into<String>, claim_name: impl Into<String>) {
        self.volumes.insert(id.into(), claim_name.into());
    }

    pub fn add_database(&mut self, db: Database) {
        self.databases.push(db);
    }

    pub fn is_empty(&self) -> bool { self.volumes.is_empty() && self.databases.is_empty() }
}

/// Controller-reported progress of a backup-family object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub start_timestamp: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub completion_timestamp: String,
}

/// Behaviour shared by backups, restores and scheduled backups.
pub trait BackupObject: HasMeta {
    fn status(&self) -> &BackupStatus;
    fn status_mut(&mut self) -> &mut BackupStatus;
    fn source(&self) -> &BackupSource;
    fn source_mut(&mut self) -> &mut BackupSource;

    fn phase(&self) -> Option<&Phase> { self.status().phase.as_ref() }

    fn is_completed(&self) -> bool { self.phase().map_or(false, Phase::is_completed) }

    /// Phase rendered for display; empty when the controller has not reported one.
    fn friendly_phase(&self) -> String {
        self.phase().map(|p| friendly_phase(p.as_str())).unwrap_or_default()
    }

    /// The friendly-name annotation when present and non-empty, else the object name.
    fn friendly_name(&self) -> &str {
        match self.meta().annotation(FRIENDLY_NAME_ANNOTATION) {
            Some(n) if !n.is_empty() => n,
            _ => self.name(),
        }
    }

    fn set_friendly_name(&mut self, friendly: impl Into<String>)
    where
        Self: Sized,
    {
        self.meta_mut().annotations.insert(FRIENDLY_NAME_ANNOTATION.to_string(), friendly.into());
    }
}

macro_rules! backup_object {
    ($ty:ty) => {
        impl HasMeta for $ty {
            fn meta(&self) -> &ObjectMeta { &self.meta }
            fn meta_mut(&mut self) -> &mut ObjectMeta { &mut self.meta }
        }

        impl BackupObject for $ty {
            fn status(&self) -> &BackupStatus { &self.status }
            fn status_mut(&mut self) -> &mut BackupStatus { &mut self.status }
            fn source(&self) -> &BackupSource { &self.source }
            fn source_mut(&mut self) -> &mut BackupSource { &mut self.source }
        }
    };
}

/// A one-off backup of volumes and databases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backup {
    pub meta: ObjectMeta,
    #[serde(default)]
    pub status: BackupStatus,
    #[serde(default)]
    pub source: BackupSource,
    /// Snapshot identifier assigned by restic once the backup has run.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub restic_id: String,
}

impl Backup {
    pub fn new(name: impl Into<String>) -> Self {
        Self { meta: ObjectMeta::named(name), ..Default::default() }
    }
}

backup_object!(Backup);

/// A restore of a named backup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restore {
    pub meta: ObjectMeta,
    #[serde(default)]
    pub status: BackupStatus,
    #[serde(default)]
    pub source: BackupSource,
    /// Name of the [`Backup`] this restore reads from.
    pub backup_name: String,
}

impl Restore {
    pub fn new(name: impl Into<String>, backup_name: impl Into<String>) -> Self {
        Self { meta: ObjectMeta::named(name), backup_name: backup_name.into(), ..Default::default() }
    }
}

backup_object!(Restore);

/// A cron-driven backup schedule with retention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledBackup {
    pub meta: ObjectMeta,
    #[serde(default)]
    pub status: BackupStatus,
    #[serde(default)]
    pub source: BackupSource,
    pub schedule: String,
    pub retention: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_executed: String,
    pub starting_deadline_seconds: i64,
}

impl Default for ScheduledBackup {
    fn default() -> Self {
        Self {
            meta: ObjectMeta::default(),
            status: BackupStatus::default(),
            source: BackupSource::default(),
            schedule: String::new(),
            retention: 0,
            last_executed: String::new(),
            starting_deadline_seconds: DEFAULT_STARTING_DEADLINE_SECONDS,
        }
    }
}

impl ScheduledBackup {
    pub fn new(name: impl Into<String>, schedule: impl Into<String>, retention: i64) -> Self {
        Self { meta: ObjectMeta::named(name), schedule: schedule.into(), retention, ..Default::default() }
    }
}

backup_object!(ScheduledBackup);

/// Backup from one environment followed by a restore into another.
///
/// Carries two independent phases rather than one, so it is not a
/// [`BackupObject`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sync {
    pub meta: ObjectMeta,
    pub site: String,
    pub backup_env: String,
    pub restore_env: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_phase: Option<Phase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_phase: Option<Phase>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub start_timestamp: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub completion_timestamp: String,
    #[serde(default)]
    pub backup: BackupSource,
    #[serde(default)]
    pub restore: BackupSource,
}

impl Sync {
    pub fn new(
        name: impl Into<String>,
        site: impl Into<String>,
        backup_env: impl Into<String>,
        restore_env: impl Into<String>,
    ) -> Self {
        Self {
            meta: ObjectMeta::named(name),
            site: site.into(),
            backup_env: backup_env.into(),
            restore_env: restore_env.into(),
            ..Default::default()
        }
    }

    pub fn backup_volumes(&self) -> &BTreeMap<String, String> { &self.backup.volumes }
    pub fn restore_volumes(&self) -> &BTreeMap<String, String> { &self.restore.volumes }
    pub fn backup_databases(&self) -> &[Database] { &self.backup.databases }
    pub fn restore_databases(&self) -> &[Database] { &self.restore.databases }

    /// Both halves have finished.
    pub fn is_completed(&self) -> bool {
        self.backup_phase.as_ref().map_or(false, Phase::is_completed)
            && self.restore_phase.as_ref().map_or(false, Phase::is_completed)
    }
}

impl HasMeta for Sync {
    fn meta(&self) -> &ObjectMeta { &self.meta }
    fn meta_mut(&mut self) -> &mut ObjectMeta { &mut self.meta }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::Annotation;

    #[test]
    fn friendly_name_prefers_annotation() {
        let mut b = Backup::new("backup-7x2");
        assert_eq!(b.friendly_name(), "backup-7x2");
        b.meta.set_annotation(Annotation::new(FRIENDLY_NAME_ANNOTATION, "nightly"));
        assert_eq!(b.friendly_name(), "nightly");
        b.set_friendly_name("");
        assert_eq!(b.friendly_name(), "backup-7x2");
    }

    #[test]
    fn completion_follows_phase() {
        let mut r = Restore::new("r1", "b1");
        assert!(!r.is_completed());
        assert_eq!(r.friendly_phase(), "");
        r.status.phase = Some(Phase::InProgress);
        assert!(!r.is_completed());
        assert_eq!(r.friendly_phase(), "In Progress");
        r.status.phase = Some(Phase::Completed);
        assert!(r.is_completed());
    }

    #[test]
    fn schedule_defaults_deadline() {
        let s = ScheduledBackup::new("nightly", "0 2 * * *", 7);
        assert_eq!(s.starting_deadline_seconds, DEFAULT_STARTING_DEADLINE_SECONDS);
        assert_eq!(ScheduledBackup::default().starting_deadline_seconds, 3600);
    }

    #[test]
    fn source_keeps_database_order() {
        let mut src = BackupSource::default();
        src.add_database(Database::new("b", "s-b", ["k"]));
        src.add_database(Database::new("a", "s-a", ["k"]));
        src.add_volume("shared", "pvc-shared");
        src.add_volume("shared", "pvc-shared-2");
        let ids: Vec<_> = src.databases.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(src.volumes.get("shared").map(String::as_str), Some("pvc-shared-2"));
    }

    #[test]
    fn sync_completes_when_both_halves_do() {
        let mut s = Sync::new("s1", "site-1", "prod", "uat");
        s.backup_phase = Some(Phase::Completed);
        assert!(!s.is_completed());
        s.restore_phase = Some(Phase::Completed);
        assert!(s.is_completed());
    }
}
