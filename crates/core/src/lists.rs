//! Append-only collections of one resource kind.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::backups::{Backup, Restore, Sync};
use crate::meta::HasMeta;

/// Direction for creation-time ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid sort order: {0} (expect ASC or DESC)")]
pub struct ParseSortOrderError(String);

impl FromStr for SortOrder {
    type Err = ParseSortOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortOrder::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortOrder::Desc)
        } else {
            Err(ParseSortOrderError(s.to_string()))
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { SortOrder::Asc => "ASC", SortOrder::Desc => "DESC" })
    }
}

/// Ordered items of a single kind. Duplicate names are kept as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct ObjectList<T> {
    items: Vec<T>,
}

impl<T> Default for ObjectList<T> {
    fn default() -> Self { Self { items: Vec::new() } }
}

impl<T: HasMeta> ObjectList<T> {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, item: T) { self.items.push(item); }
    pub fn items(&self) -> &[T] { &self.items }
    pub fn into_items(self) -> Vec<T> { self.items }
    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Items ordered by `creationTimestamp`. RFC3339 timestamps from the API
    /// server are zero-padded, so string order is time order. The sort is
    /// stable: equal timestamps keep insertion order in both directions.
    pub fn by_created_time(&self, order: SortOrder) -> Vec<&T> {
        let mut out: Vec<&T> = self.items.iter().collect();
        match order {
            SortOrder::Asc => out.sort_by(|a, b| a.creation_timestamp().cmp(b.creation_timestamp())),
            SortOrder::Desc => out.sort_by(|a, b| b.creation_timestamp().cmp(a.creation_timestamp())),
        }
        out
    }
}

impl<T: HasMeta> FromIterator<T> for ObjectList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self { items: iter.into_iter().collect() }
    }
}

impl<T> IntoIterator for ObjectList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter { self.items.into_iter() }
}

pub type BackupList = ObjectList<Backup>;
pub type RestoreList = ObjectList<Restore>;
pub type SyncList = ObjectList<Sync>;

impl ObjectList<Backup> {
    pub fn add_backup(&mut self, backup: Backup) { self.push(backup); }
    pub fn backups(&self) -> &[Backup] { self.items() }
    pub fn backups_by_created_time(&self, order: SortOrder) -> Vec<&Backup> { self.by_created_time(order) }
    pub fn backup_count(&self) -> usize { self.len() }
    pub fn has_backups(&self) -> bool { !self.is_empty() }
}

impl ObjectList<Restore> {
    pub fn add_restore(&mut self, restore: Restore) { self.push(restore); }
    pub fn restores(&self) -> &[Restore] { self.items() }
    pub fn restores_by_created_time(&self, order: SortOrder) -> Vec<&Restore> { self.by_created_time(order) }
    pub fn restore_count(&self) -> usize { self.len() }
    pub fn has_restores(&self) -> bool { !self.is_empty() }
}

impl ObjectList<Sync> {
    pub fn add_sync(&mut self, sync: Sync) { self.push(sync); }
    pub fn syncs(&self) -> &[Sync] { self.items() }
    pub fn syncs_by_created_time(&self, order: SortOrder) -> Vec<&Sync> { self.by_created_time(order) }
    pub fn sync_count(&self) -> usize { self.len() }
    pub fn has_syncs(&self) -> bool { !self.is_empty() }
}
