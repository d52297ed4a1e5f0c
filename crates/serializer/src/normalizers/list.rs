use std::marker::PhantomData;

use serde_json::Value;
use shepherd_core::{HasMeta, Kinded, ObjectList, Resource, ResourceKind};

use super::{mismatch, Normalizer};
use crate::doc::{header, Reader};
use crate::error::{DecodeError, SerializerError, SerializerResult};
use crate::Serializer;

/// Normalizer for `{items: [...]}` documents. Each item goes back through
/// the [`Serializer`], so a list needs no knowledge of its item format.
pub struct ListNormalizer<T> {
    kinds: [ResourceKind; 1],
    _item: PhantomData<fn() -> T>,
}

impl<T> ListNormalizer<T>
where
    T: Kinded + HasMeta,
    ObjectList<T>: Kinded,
{
    pub fn new() -> Self {
        Self { kinds: [ObjectList::<T>::KIND], _item: PhantomData }
    }
}

impl<T> Default for ListNormalizer<T>
where
    T: Kinded + HasMeta,
    ObjectList<T>: Kinded,
{
    fn default() -> Self { Self::new() }
}

impl<T> Normalizer for ListNormalizer<T>
where
    T: Kinded + HasMeta,
    ObjectList<T>: Kinded,
{
    fn supported(&self) -> &[ResourceKind] { &self.kinds }

    fn decode(&self, doc: &Value, kind: ResourceKind, serializer: &Serializer) -> SerializerResult<Resource> {
        let r = Reader::new(doc, kind)?;
        let mut list = ObjectList::<T>::new();
        for (index, item) in r.array("/items")?.into_iter().flatten().enumerate() {
            let decoded = serializer.decode(item, T::KIND).map_err(|e| match e {
                SerializerError::Decode(source) => {
                    SerializerError::Decode(DecodeError::Item { list: kind, index, source: Box::new(source) })
                }
                other => other,
            })?;
            let item = T::try_from(decoded).map_err(|other| mismatch(T::KIND, &other))?;
            list.push(item);
        }
        Ok(list.into())
    }

    fn encode(&self, resource: &Resource, serializer: &Serializer) -> SerializerResult<Value> {
        let list = ObjectList::<T>::try_from(resource.clone())
            .map_err(|other| mismatch(ObjectList::<T>::KIND, &other))?;
        let items = list
            .into_iter()
            .map(|item| serializer.encode(&item.into()))
            .collect::<SerializerResult<Vec<_>>>()?;
        let mut doc = header(ObjectList::<T>::KIND);
        doc.insert("items".into(), Value::Array(items));
        Ok(Value::Object(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SerializerFactory;
    use serde_json::json;
    use shepherd_core::{Backup, BackupList, SortOrder};

    #[test]
    fn items_decode_through_the_dispatcher() {
        let doc = json!({"items": [
            {"metadata": {"name": "jan", "creationTimestamp": "2024-01-01T00:00:00Z"}},
            {"metadata": {"name": "mar", "creationTimestamp": "2024-03-01T00:00:00Z"}},
            {"metadata": {"name": "feb", "creationTimestamp": "2024-02-01T00:00:00Z"}}
        ]});
        let list: BackupList = SerializerFactory::create().decode_as(&doc).unwrap();
        assert_eq!(list.backup_count(), 3);
        let names: Vec<_> = list.backups_by_created_time(SortOrder::Desc).iter().map(|b| b.meta.name.as_str()).collect();
        assert_eq!(names, ["mar", "feb", "jan"]);
    }

    #[test]
    fn missing_items_is_an_empty_list() {
        let list: BackupList = SerializerFactory::create().decode_as(&json!({"items": null})).unwrap();
        assert!(!list.has_backups());
    }

    #[test]
    fn item_errors_carry_their_index() {
        let doc = json!({"items": [{"metadata": {"name": "ok"}}, {"metadata": {}}]});
        let err = SerializerFactory::create().decode(&doc, ResourceKind::BackupList).unwrap_err();
        match err {
            SerializerError::Decode(DecodeError::Item { list, index, source }) => {
                assert_eq!(list, ResourceKind::BackupList);
                assert_eq!(index, 1);
                assert!(matches!(*source, DecodeError::MissingField { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn encodes_items_in_order() {
        let list: BackupList = ["a", "b"].into_iter().map(Backup::new).collect();
        let doc = SerializerFactory::create().encode(&list.into()).unwrap();
        assert_eq!(doc["kind"], "BackupList");
        assert_eq!(doc["items"][0]["metadata"]["name"], "a");
        assert_eq!(doc["items"][1]["metadata"]["name"], "b");
    }
}
