// Hierarchical configuration tree for flagpost

pub mod builder;
pub mod env;
pub mod error;
pub mod loader;
pub mod section;

pub use builder::ConfigTreeBuilder;
pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use section::ConfigSection;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Separator between nested section keys, e.g. `Features:Shop:Cart`.
pub const KEY_DELIMITER: char = ':';

/// Immutable configuration tree.
///
/// The root is always a JSON object. Key lookups are ASCII case-insensitive,
/// with an exact match taking priority.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTree {
    root: Value,
}

impl ConfigTree {
    /// Create an empty configuration tree
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Builder for layering several sources
    pub fn builder() -> ConfigTreeBuilder {
        ConfigTreeBuilder::new()
    }

    /// Wrap an existing JSON object
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(ConfigError::ParseError(
                "Configuration root must be an object".to_string(),
            ));
        }
        Ok(Self { root: value })
    }

    /// The root section
    pub fn root(&self) -> ConfigSection<'_> {
        ConfigSection::new(String::new(), Some(&self.root))
    }

    /// Section at a `:`-delimited path
    pub fn section(&self, path: &str) -> ConfigSection<'_> {
        self.root().section(path)
    }

    /// Top-level sections
    pub fn children(&self) -> Vec<ConfigSection<'_>> {
        self.root().children()
    }

    /// Deserialize the node at `path`
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.section(path).get()
    }

    /// Deserialize the node at `path`, falling back to `default`
    pub fn get_or<T: DeserializeOwned>(&self, path: &str, default: T) -> T {
        self.get(path).unwrap_or(default)
    }

    /// Check if a section exists
    pub fn has(&self, path: &str) -> bool {
        self.section(path).exists()
    }

    /// The underlying JSON document
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub(crate) fn merge(&mut self, other: Value) {
        merge_value(&mut self.root, other);
    }

    pub(crate) fn set(&mut self, path: &str, value: Value) {
        insert_path(&mut self.root, path, value);
    }
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep-merge `source` into `target`; objects merge per key, anything else replaces.
fn merge_value(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match section::find_key(existing, &key).map(str::to_string) {
                    Some(found) => {
                        if let Some(slot) = existing.get_mut(&found) {
                            merge_value(slot, value);
                        }
                    }
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}

/// Place `value` at a `:`-delimited path, replacing scalars on the way with objects.
pub(crate) fn insert_path(root: &mut Value, path: &str, value: Value) {
    let segments: Vec<&str> = path
        .split(KEY_DELIMITER)
        .filter(|s| !s.is_empty())
        .collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut node = root;
    for segment in parents {
        node = child_object(node, segment);
    }
    if let Value::Object(map) = node {
        match section::find_key(map, last).map(str::to_string) {
            Some(found) => {
                map.insert(found, value);
            }
            None => {
                map.insert((*last).to_string(), value);
            }
        }
    }
}

fn child_object<'v>(node: &'v mut Value, key: &str) -> &'v mut Value {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    let Value::Object(map) = node else {
        unreachable!("node was just replaced with an object");
    };

    let key = section::find_key(map, key)
        .map(str::to_string)
        .unwrap_or_else(|| key.to_string());
    let child = map.entry(key).or_insert_with(|| Value::Object(Map::new()));
    if !child.is_object() {
        *child = Value::Object(Map::new());
    }
    child
}
