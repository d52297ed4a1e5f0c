//! Shepherd core types: metadata, phases, backup-family entities, lists and
//! the built-in kinds managed through the OpenShift API.

#![forbid(unsafe_code)]

pub mod backups;
pub mod builtin;
pub mod lists;
pub mod meta;
pub mod phase;
pub mod resource;

pub use backups::{
    Backup, BackupObject, BackupSource, BackupStatus, Database, Restore, ScheduledBackup, Sync,
    DEFAULT_STARTING_DEADLINE_SECONDS, FRIENDLY_NAME_ANNOTATION,
};
pub use builtin::{ConfigMap, Hpa, NetworkPolicy, Route, StatefulSet};
pub use lists::{BackupList, ObjectList, RestoreList, SortOrder, SyncList};
pub use meta::{Annotation, HasMeta, Label, ObjectMeta};
pub use phase::{friendly_phase, Phase};
pub use resource::{Kinded, Resource, ResourceKind, SHEPHERD_API_VERSION};

pub mod prelude {
    pub use super::{
        Backup, BackupList, BackupObject, Database, HasMeta, Kinded, Label, ObjectMeta, Phase, Resource,
        ResourceKind, Restore, RestoreList, ScheduledBackup, SortOrder, SyncList,
    };
}
