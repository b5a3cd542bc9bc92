// Borrowed views into a configuration tree

use crate::{ConfigError, KEY_DELIMITER, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A view of one node in a [`ConfigTree`](crate::ConfigTree).
///
/// Sections are cheap to create and may point at nodes that do not exist;
/// [`exists`](Self::exists) tells the two apart.
#[derive(Debug, Clone)]
pub struct ConfigSection<'a> {
    path: String,
    node: Option<&'a Value>,
}

impl<'a> ConfigSection<'a> {
    pub(crate) fn new(path: String, node: Option<&'a Value>) -> Self {
        Self { path, node }
    }

    /// Full `:`-delimited path of this section, empty for the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last segment of the path.
    pub fn key(&self) -> &str {
        self.path
            .rsplit(KEY_DELIMITER)
            .next()
            .unwrap_or(self.path.as_str())
    }

    /// Scalar value of this node rendered as a string.
    ///
    /// Objects, arrays and `null` have no scalar value.
    pub fn value(&self) -> Option<String> {
        match self.node? {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Null | Value::Object(_) | Value::Array(_) => None,
        }
    }

    /// Whether the node carries a scalar value or has children.
    ///
    /// An empty object is present in its parent's children but does not exist
    /// on its own.
    pub fn exists(&self) -> bool {
        self.value().is_some() || self.has_children()
    }

    /// Whether the node has at least one child.
    pub fn has_children(&self) -> bool {
        match self.node {
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            _ => false,
        }
    }

    /// Direct children, object keys in sorted order. Array items are keyed by index.
    pub fn children(&self) -> Vec<ConfigSection<'a>> {
        match self.node {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(key, value)| ConfigSection::new(self.child_path(key), Some(value)))
                .collect(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, value)| {
                    ConfigSection::new(self.child_path(&index.to_string()), Some(value))
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Descend into a relative path such as `Shop:Cart`.
    ///
    /// An empty path returns this section. An empty segment inside a path
    /// (`Shop::Cart`, `Shop:`) never matches a child.
    pub fn section(&self, relative: &str) -> ConfigSection<'a> {
        if relative.is_empty() {
            return self.clone();
        }

        let mut node = self.node;
        let mut path = self.path.clone();

        for segment in relative.split(KEY_DELIMITER) {
            node = node.and_then(|value| match segment {
                "" => None,
                _ => lookup(value, segment),
            });
            if !path.is_empty() {
                path.push(KEY_DELIMITER);
            }
            path.push_str(segment);
        }

        ConfigSection::new(path, node)
    }

    /// Deserialize this node into `T`.
    pub fn get<T: DeserializeOwned>(&self) -> Result<T> {
        let node = self
            .node
            .ok_or_else(|| ConfigError::KeyNotFound(self.path.clone()))?;

        serde_json::from_value(node.clone()).map_err(|e| ConfigError::DeserializationError {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Raw JSON node, if present.
    pub fn as_value(&self) -> Option<&'a Value> {
        self.node
    }

    fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}{}{}", self.path, KEY_DELIMITER, key)
        }
    }
}

/// Find a child by key, preferring an exact match over a case-insensitive one.
pub(crate) fn lookup<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => find_key(map, key).and_then(|k| map.get(k)),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

pub(crate) fn find_key<'m>(map: &'m Map<String, Value>, key: &str) -> Option<&'m str> {
    if let Some((k, _)) = map.get_key_value(key) {
        return Some(k.as_str());
    }
    map.keys()
        .find(|k| k.eq_ignore_ascii_case(key))
        .map(|k| k.as_str())
}
