//! Reading and writing loosely-typed wire documents.
//!
//! Paths are JSON pointers (`/spec/schedule/crontab`). Missing and `null`
//! are treated alike. An empty JSON array is accepted wherever a mapping is
//! expected, since some producers serialise an empty map as `[]`.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use shepherd_core::{ObjectMeta, Phase, ResourceKind};

use crate::error::DecodeError;

/// Escape a mapping key for use inside a JSON pointer.
pub(crate) fn escape_key(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Typed accessors over one document, reporting errors against `kind`.
pub(crate) struct Reader<'a> {
    doc: &'a Value,
    kind: ResourceKind,
    base: String,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(doc: &'a Value, kind: ResourceKind) -> Result<Self, DecodeError> {
        if !doc.is_object() {
            return Err(DecodeError::InvalidType { kind, path: "/".into(), expected: "an object" });
        }
        Ok(Self { doc, kind, base: String::new() })
    }

    /// Reader rooted at the mapping at `path`; errors report the full path.
    /// An absent mapping reads as empty, any other shape is an error.
    pub(crate) fn nested(&self, path: &str) -> Result<Reader<'a>, DecodeError> {
        static NULL: Value = Value::Null;
        let doc = match self.object(path)? {
            Some(_) => self.get(path).unwrap_or(&NULL),
            None => &NULL,
        };
        Ok(Reader { doc, kind: self.kind, base: self.full(path) })
    }

    pub(crate) fn kind(&self) -> ResourceKind { self.kind }

    fn full(&self, path: &str) -> String { format!("{}{}", self.base, path) }

    fn get(&self, path: &str) -> Option<&'a Value> {
        self.doc.pointer(path).filter(|v| !v.is_null())
    }

    fn missing(&self, path: &str) -> DecodeError {
        DecodeError::MissingField { kind: self.kind, path: self.full(path) }
    }

    fn invalid(&self, path: &str, expected: &'static str) -> DecodeError {
        DecodeError::InvalidType { kind: self.kind, path: self.full(path), expected }
    }

    pub(crate) fn required_str(&self, path: &str) -> Result<String, DecodeError> {
        match self.get(path) {
            None => Err(self.missing(path)),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(self.invalid(path, "a string")),
        }
    }

    pub(crate) fn optional_str(&self, path: &str) -> Result<String, DecodeError> {
        match self.get(path) {
            None => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(self.invalid(path, "a string")),
        }
    }

    /// String at `path`, or `default` when the key is absent. A present
    /// empty string is kept as is.
    pub(crate) fn optional_str_or(&self, path: &str, default: &str) -> Result<String, DecodeError> {
        match self.get(path) {
            None => Ok(default.to_string()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(self.invalid(path, "a string")),
        }
    }

    fn int(&self, path: &str, v: &Value) -> Result<i64, DecodeError> {
        match v {
            Value::Number(n) => n.as_i64().ok_or_else(|| self.invalid(path, "an integer")),
            // numeric strings show up from controllers that template their specs
            Value::String(s) => s.trim().parse::<i64>().map_err(|_| self.invalid(path, "an integer")),
            _ => Err(self.invalid(path, "an integer")),
        }
    }

    pub(crate) fn required_i64(&self, path: &str) -> Result<i64, DecodeError> {
        let v = self.get(path).ok_or_else(|| self.missing(path))?;
        self.int(path, v)
    }

    pub(crate) fn optional_i64(&self, path: &str, default: i64) -> Result<i64, DecodeError> {
        match self.get(path) {
            None => Ok(default),
            Some(v) => self.int(path, v),
        }
    }

    /// Mapping at `path`, or `None` when absent (or an empty array).
    pub(crate) fn object(&self, path: &str) -> Result<Option<&'a Map<String, Value>>, DecodeError> {
        match self.get(path) {
            None => Ok(None),
            Some(Value::Object(m)) => Ok(Some(m)),
            Some(Value::Array(a)) if a.is_empty() => Ok(None),
            Some(_) => Err(self.invalid(path, "a mapping")),
        }
    }

    pub(crate) fn array(&self, path: &str) -> Result<Option<&'a Vec<Value>>, DecodeError> {
        match self.get(path) {
            None => Ok(None),
            Some(Value::Array(a)) => Ok(Some(a)),
            Some(_) => Err(self.invalid(path, "a list")),
        }
    }

    pub(crate) fn string_map(&self, path: &str) -> Result<BTreeMap<String, String>, DecodeError> {
        let mut out = BTreeMap::new();
        if let Some(m) = self.object(path)? {
            for (k, v) in m {
                match v {
                    Value::String(s) => { out.insert(k.clone(), s.clone()); }
                    _ => return Err(self.invalid(&format!("{}/{}", path, escape_key(k)), "a string")),
                }
            }
        }
        Ok(out)
    }

    pub(crate) fn string_list(&self, path: &str) -> Result<Vec<String>, DecodeError> {
        let mut out = Vec::new();
        if let Some(items) = self.array(path)? {
            for (i, v) in items.iter().enumerate() {
                match v {
                    Value::String(s) => out.push(s.clone()),
                    _ => return Err(self.invalid(&format!("{}/{}", path, i), "a string")),
                }
            }
        }
        Ok(out)
    }

    /// Phase at `path`; absent means the controller has not reported one.
    /// Any present string, even an empty one, is kept.
    pub(crate) fn phase(&self, path: &str) -> Result<Option<Phase>, DecodeError> {
        match self.get(path) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(Phase::from(s.clone()))),
            Some(_) => Err(self.invalid(path, "a string")),
        }
    }

    /// `metadata` block. Only `metadata.name` is required.
    pub(crate) fn meta(&self) -> Result<ObjectMeta, DecodeError> {
        Ok(ObjectMeta {
            name: self.required_str("/metadata/name")?,
            labels: self.string_map("/metadata/labels")?,
            annotations: self.string_map("/metadata/annotations")?,
            creation_timestamp: self.optional_str("/metadata/creationTimestamp")?,
            deletion_timestamp: self.optional_str("/metadata/deletionTimestamp")?,
            resource_version: self.optional_str("/metadata/resourceVersion")?,
        })
    }
}

/// `apiVersion` and `kind` header of an encoded document.
pub(crate) fn header(kind: ResourceKind) -> Map<String, Value> {
    let mut doc = Map::new();
    doc.insert("apiVersion".into(), Value::from(kind.api_version()));
    doc.insert("kind".into(), Value::from(kind.kind()));
    doc
}

pub(crate) fn string_map_value(map: &BTreeMap<String, String>) -> Value {
    Value::Object(map.iter().map(|(k, v)| (k.clone(), Value::from(v.as_str()))).collect())
}

/// Encode `metadata`. Empty label/annotation sets, unset timestamps and an
/// unset resource version are omitted rather than written empty.
pub(crate) fn encode_meta(meta: &ObjectMeta) -> Value {
    let mut out = Map::new();
    out.insert("name".into(), Value::from(meta.name.as_str()));
    if !meta.labels.is_empty() {
        out.insert("labels".into(), string_map_value(&meta.labels));
    }
    if !meta.annotations.is_empty() {
        out.insert("annotations".into(), string_map_value(&meta.annotations));
    }
    if !meta.creation_timestamp.is_empty() {
        out.insert("creationTimestamp".into(), Value::from(meta.creation_timestamp.as_str()));
    }
    if !meta.deletion_timestamp.is_empty() {
        out.insert("deletionTimestamp".into(), Value::from(meta.deletion_timestamp.as_str()));
    }
    if !meta.resource_version.is_empty() {
        out.insert("resourceVersion".into(), Value::from(meta.resource_version.as_str()));
    }
    Value::Object(out)
}

/// Collects non-empty status fields; yields `None` when nothing was set.
#[derive(Default)]
pub(crate) struct StatusWriter(Map<String, Value>);

impl StatusWriter {
    pub(crate) fn str(mut self, key: &str, value: &str) -> Self {
        if !value.is_empty() {
            self.0.insert(key.into(), Value::from(value));
        }
        self
    }

    /// A set phase is always written, so `Some(Phase::Other(""))` survives.
    pub(crate) fn phase(mut self, key: &str, phase: Option<&Phase>) -> Self {
        if let Some(p) = phase {
            self.0.insert(key.into(), Value::from(p.as_str()));
        }
        self
    }

    pub(crate) fn finish(self) -> Option<Value> {
        if self.0.is_empty() { None } else { Some(Value::Object(self.0)) }
    }
}
