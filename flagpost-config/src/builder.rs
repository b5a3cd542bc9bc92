// ConfigTreeBuilder - layered construction of a ConfigTree

use crate::{ConfigError, ConfigLoader, ConfigTree, EnvLoader, FileFormat, Result};
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

enum Source {
    Inline(String, FileFormat),
    File {
        path: PathBuf,
        format: Option<FileFormat>,
        optional: bool,
    },
    Env(Option<String>),
    Set(String, Value),
}

/// Builder for [`ConfigTree`].
///
/// Sources are applied in the order they were added; later sources win
/// per leaf when paths overlap.
#[derive(Default)]
pub struct ConfigTreeBuilder {
    sources: Vec<Source>,
}

impl ConfigTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a JSON document
    pub fn add_json_str(mut self, content: impl Into<String>) -> Self {
        self.sources
            .push(Source::Inline(content.into(), FileFormat::Json));
        self
    }

    /// Add a TOML document
    pub fn add_toml_str(mut self, content: impl Into<String>) -> Self {
        self.sources
            .push(Source::Inline(content.into(), FileFormat::Toml));
        self
    }

    /// Add a configuration file that must exist
    pub fn add_file(mut self, path: impl Into<PathBuf>, format: FileFormat) -> Self {
        self.sources.push(Source::File {
            path: path.into(),
            format: Some(format),
            optional: false,
        });
        self
    }

    /// Add a configuration file, detecting the format from its extension
    pub fn add_file_auto(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(Source::File {
            path: path.into(),
            format: None,
            optional: false,
        });
        self
    }

    /// Add a configuration file that is skipped when missing
    pub fn add_optional_file(mut self, path: impl Into<PathBuf>, format: FileFormat) -> Self {
        self.sources.push(Source::File {
            path: path.into(),
            format: Some(format),
            optional: true,
        });
        self
    }

    /// Add a .env file. Its variables are read without touching the process environment.
    pub fn add_dotenv(self, path: impl Into<PathBuf>) -> Self {
        self.add_file(path, FileFormat::Env)
    }

    /// Add process environment variables, optionally filtered by prefix
    pub fn add_env(mut self, prefix: Option<&str>) -> Self {
        self.sources.push(Source::Env(prefix.map(str::to_string)));
        self
    }

    /// Set a single value at a `:`-delimited path
    pub fn set(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.sources.push(Source::Set(path.into(), value.into()));
        self
    }

    /// Build the configuration tree
    pub fn build(self) -> Result<ConfigTree> {
        let mut tree = ConfigTree::new();

        for source in self.sources {
            match source {
                Source::Inline(content, format) => {
                    tree.merge(ConfigLoader::new(format).parse(&content)?);
                }
                Source::File {
                    path,
                    format,
                    optional,
                } => {
                    if optional && !path.exists() {
                        debug!(path = %path.display(), "Skipping missing optional configuration file");
                        continue;
                    }
                    let loader = match format {
                        Some(format) => ConfigLoader::new(format),
                        None => ConfigLoader::auto(&path)?,
                    };
                    debug!(path = %path.display(), "Loading configuration file");
                    tree.merge(loader.load_file(&path)?);
                }
                Source::Env(prefix) => {
                    for (path, value) in EnvLoader::new(prefix).load() {
                        tree.set(&path, Value::String(value));
                    }
                }
                Source::Set(path, value) => {
                    if path.is_empty() {
                        return Err(ConfigError::LoadError(
                            "Cannot set a value at the root path".to_string(),
                        ));
                    }
                    tree.set(&path, value);
                }
            }
        }

        Ok(tree)
    }
}
