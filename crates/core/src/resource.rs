//! Closed set of resource kinds and the tagged union over their entities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::backups::{Backup, Restore, ScheduledBackup, Sync};
use crate::builtin::{ConfigMap, Hpa, NetworkPolicy, Route, StatefulSet};
use crate::lists::{BackupList, RestoreList, SyncList};
use crate::meta::{HasMeta, ObjectMeta};

/// apiVersion of the shepherd custom resources.
pub const SHEPHERD_API_VERSION: &str = "extension.shepherd/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Backup,
    BackupList,
    Restore,
    RestoreList,
    ScheduledBackup,
    Sync,
    SyncList,
    ConfigMap,
    Route,
    NetworkPolicy,
    Hpa,
    StatefulSet,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 12] = [
        ResourceKind::Backup,
        ResourceKind::BackupList,
        ResourceKind::Restore,
        ResourceKind::RestoreList,
        ResourceKind::ScheduledBackup,
        ResourceKind::Sync,
        ResourceKind::SyncList,
        ResourceKind::ConfigMap,
        ResourceKind::Route,
        ResourceKind::NetworkPolicy,
        ResourceKind::Hpa,
        ResourceKind::StatefulSet,
    ];

    /// `apiVersion` literal written into encoded documents.
    pub fn api_version(self) -> &'static str {
        match self {
            ResourceKind::Backup
            | ResourceKind::BackupList
            | ResourceKind::Restore
            | ResourceKind::RestoreList
            | ResourceKind::ScheduledBackup
            | ResourceKind::Sync
            | ResourceKind::SyncList => SHEPHERD_API_VERSION,
            ResourceKind::ConfigMap | ResourceKind::Route => "v1",
            ResourceKind::NetworkPolicy => "extensions/v1beta1",
            ResourceKind::Hpa => "autoscaling/v1",
            ResourceKind::StatefulSet => "apps/v1",
        }
    }

    /// `kind` literal written into encoded documents.
    pub fn kind(self) -> &'static str {
        match self {
            ResourceKind::Backup => "Backup",
            ResourceKind::BackupList => "BackupList",
            ResourceKind::Restore => "Restore",
            ResourceKind::RestoreList => "RestoreList",
            ResourceKind::ScheduledBackup => "BackupScheduled",
            ResourceKind::Sync => "Sync",
            ResourceKind::SyncList => "SyncList",
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::Route => "Route",
            ResourceKind::NetworkPolicy => "NetworkPolicy",
            ResourceKind::Hpa => "HorizontalPodAutoscaler",
            ResourceKind::StatefulSet => "StatefulSet",
        }
    }

    /// Lowercase plural REST resource name; list kinds share their item's.
    pub fn plural(self) -> &'static str {
        match self {
            ResourceKind::Backup | ResourceKind::BackupList => "backups",
            ResourceKind::Restore | ResourceKind::RestoreList => "restores",
            ResourceKind::ScheduledBackup => "backupscheduleds",
            ResourceKind::Sync | ResourceKind::SyncList => "syncs",
            ResourceKind::ConfigMap => "configmaps",
            ResourceKind::Route => "routes",
            ResourceKind::NetworkPolicy => "networkpolicies",
            ResourceKind::Hpa => "horizontalpodautoscalers",
            ResourceKind::StatefulSet => "statefulsets",
        }
    }

    pub fn is_list(self) -> bool {
        matches!(self, ResourceKind::BackupList | ResourceKind::RestoreList | ResourceKind::SyncList)
    }

    /// Item kind of a list kind.
    pub fn item_kind(self) -> Option<ResourceKind> {
        match self {
            ResourceKind::BackupList => Some(ResourceKind::Backup),
            ResourceKind::RestoreList => Some(ResourceKind::Restore),
            ResourceKind::SyncList => Some(ResourceKind::Sync),
            _ => None,
        }
    }

    /// List kind holding items of this kind.
    pub fn list_kind(self) -> Option<ResourceKind> {
        match self {
            ResourceKind::Backup => Some(ResourceKind::BackupList),
            ResourceKind::Restore => Some(ResourceKind::RestoreList),
            ResourceKind::Sync => Some(ResourceKind::SyncList),
            _ => None,
        }
    }

    /// Exact match on a document's `kind` field.
    pub fn from_wire_kind(kind: &str) -> Option<ResourceKind> {
        ResourceKind::ALL.into_iter().find(|k| k.kind() == kind)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown resource kind: {0}")]
pub struct ParseKindError(String);

/// Lenient parse for user input: wire kind, plural, or a short alias, any case.
impl FromStr for ResourceKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(k) = ResourceKind::from_wire_kind(s) {
            return Ok(k);
        }
        let lower = s.to_ascii_lowercase();
        let alias = match lower.as_str() {
            "backup" | "backups" => Some(ResourceKind::Backup),
            "backuplist" => Some(ResourceKind::BackupList),
            "restore" | "restores" => Some(ResourceKind::Restore),
            "restorelist" => Some(ResourceKind::RestoreList),
            "schedule" | "schedules" | "scheduledbackup" | "backupscheduled" | "backupscheduleds" => {
                Some(ResourceKind::ScheduledBackup)
            }
            "sync" | "syncs" => Some(ResourceKind::Sync),
            "synclist" => Some(ResourceKind::SyncList),
            "configmap" | "configmaps" | "cm" => Some(ResourceKind::ConfigMap),
            "route" | "routes" => Some(ResourceKind::Route),
            "networkpolicy" | "networkpolicies" | "netpol" => Some(ResourceKind::NetworkPolicy),
            "hpa" | "horizontalpodautoscaler" | "horizontalpodautoscalers" => Some(ResourceKind::Hpa),
            "statefulset" | "statefulsets" | "sts" => Some(ResourceKind::StatefulSet),
            _ => None,
        };
        alias.ok_or_else(|| ParseKindError(s.to_string()))
    }
}

/// A decoded entity of any supported kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "object")]
pub enum Resource {
    Backup(Backup),
    BackupList(BackupList),
    Restore(Restore),
    RestoreList(RestoreList),
    ScheduledBackup(ScheduledBackup),
    Sync(Sync),
    SyncList(SyncList),
    ConfigMap(ConfigMap),
    Route(Route),
    NetworkPolicy(NetworkPolicy),
    Hpa(Hpa),
    StatefulSet(StatefulSet),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Backup(_) => ResourceKind::Backup,
            Resource::BackupList(_) => ResourceKind::BackupList,
            Resource::Restore(_) => ResourceKind::Restore,
            Resource::RestoreList(_) => ResourceKind::RestoreList,
            Resource::ScheduledBackup(_) => ResourceKind::ScheduledBackup,
            Resource::Sync(_) => ResourceKind::Sync,
            Resource::SyncList(_) => ResourceKind::SyncList,
            Resource::ConfigMap(_) => ResourceKind::ConfigMap,
            Resource::Route(_) => ResourceKind::Route,
            Resource::NetworkPolicy(_) => ResourceKind::NetworkPolicy,
            Resource::Hpa(_) => ResourceKind::Hpa,
            Resource::StatefulSet(_) => ResourceKind::StatefulSet,
        }
    }

    /// Metadata of a single object; `None` for list kinds.
    pub fn meta(&self) -> Option<&ObjectMeta> {
        match self {
            Resource::Backup(o) => Some(o.meta()),
            Resource::Restore(o) => Some(o.meta()),
            Resource::ScheduledBackup(o) => Some(o.meta()),
            Resource::Sync(o) => Some(o.meta()),
            Resource::ConfigMap(o) => Some(o.meta()),
            Resource::Route(o) => Some(o.meta()),
            Resource::NetworkPolicy(o) => Some(o.meta()),
            Resource::Hpa(o) => Some(o.meta()),
            Resource::StatefulSet(o) => Some(o.meta()),
            Resource::BackupList(_) | Resource::RestoreList(_) | Resource::SyncList(_) => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.meta().map(|m| m.name.as_str())
    }
}

/// An entity type with a fixed [`ResourceKind`], convertible to and from [`Resource`].
pub trait Kinded: Into<Resource> + TryFrom<Resource, Error = Resource> {
    const KIND: ResourceKind;
}

macro_rules! kinded {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Resource {
                fn from(v: $ty) -> Self { Resource::$variant(v) }
            }

            impl TryFrom<Resource> for $ty {
                type Error = Resource;

                fn try_from(r: Resource) -> Result<Self, Self::Error> {
                    match r {
                        Resource::$variant(v) => Ok(v),
                        other => Err(other),
                    }
                }
            }

            impl Kinded for $ty {
                const KIND: ResourceKind = ResourceKind::$variant;
            }
        )+
    };
}

kinded! {
    Backup => Backup,
    BackupList => BackupList,
    Restore => Restore,
    RestoreList => RestoreList,
    ScheduledBackup => ScheduledBackup,
    Sync => Sync,
    SyncList => SyncList,
    ConfigMap => ConfigMap,
    Route => Route,
    NetworkPolicy => NetworkPolicy,
    Hpa => Hpa,
    StatefulSet => StatefulSet,
}
