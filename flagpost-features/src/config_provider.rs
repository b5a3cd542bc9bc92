//! Configuration-backed toggles.
//!
//! Features live under a root section (`Features` by default). A feature is
//! either a boolean scalar or a section that may carry an `Enabled` key and
//! nested sub-features:
//!
//! ```json
//! {
//!   "Features": {
//!     "Beta": true,
//!     "Shop": {
//!       "Cart": { "Enabled": false, "ShareCart": {} }
//!     }
//!   }
//! }
//! ```

use crate::error::FeatureResult;
use crate::provider::{DEFAULT_PRIORITY, ToggleProvider};
use crate::toggle::{ToggleState, parse_flag};
use async_trait::async_trait;
use flagpost_config::{ConfigSection, ConfigTree, KEY_DELIMITER};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Default root section for feature toggles.
pub const DEFAULT_ROOT_SECTION: &str = "Features";

const ENABLED_KEY: &str = "Enabled";

/// Resolves toggles from a [`ConfigTree`].
#[derive(Debug, Clone)]
pub struct ConfigToggleProvider {
    config: Arc<ConfigTree>,
    root_section: String,
    priority: i32,
    nested_enumeration: bool,
}

impl ConfigToggleProvider {
    pub fn new(config: impl Into<Arc<ConfigTree>>) -> Self {
        Self {
            config: config.into(),
            root_section: DEFAULT_ROOT_SECTION.to_string(),
            priority: DEFAULT_PRIORITY,
            nested_enumeration: false,
        }
    }

    /// Read toggles from a different root section
    pub fn with_root_section(mut self, section: impl Into<String>) -> Self {
        self.root_section = section.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Enumerate nested features as dotted names instead of top-level keys only.
    ///
    /// Nested entries are evaluated with the same rules as
    /// [`evaluate`](Self::evaluate).
    pub fn with_nested_enumeration(mut self, nested: bool) -> Self {
        self.nested_enumeration = nested;
        self
    }

    /// Configuration path of a feature, e.g. `Shop.Cart` → `Features:Shop:Cart`.
    pub fn config_key(&self, feature: &str) -> String {
        format!(
            "{}{}{}",
            self.root_section,
            KEY_DELIMITER,
            feature.replace('.', &KEY_DELIMITER.to_string())
        )
    }

    /// Evaluate a feature synchronously.
    pub fn evaluate(&self, feature: &str) -> ToggleState {
        let key = self.config_key(feature);
        evaluate_section(&self.config.section(&key))
    }

    fn enumerate_top_level(&self) -> HashMap<String, bool> {
        self.config
            .section(&self.root_section)
            .children()
            .into_iter()
            .map(|child| {
                let enabled = child.value().is_some_and(|v| parse_flag(&v));
                (child.key().to_string(), enabled)
            })
            .collect()
    }

    fn enumerate_nested(&self) -> HashMap<String, bool> {
        let mut toggles = HashMap::new();
        collect_nested(
            &self.config.section(&self.root_section),
            None,
            &mut toggles,
        );
        toggles
    }
}

/// `"Foo": true` → scalar wins; `{"Enabled": ..}` → explicit switch;
/// any other non-empty section → enabled.
fn evaluate_section(section: &ConfigSection<'_>) -> ToggleState {
    if let Some(value) = section.value() {
        return ToggleState::from_bool(parse_flag(&value));
    }

    let enabled = section.section(ENABLED_KEY);
    if enabled.exists() {
        return ToggleState::from_bool(enabled.value().is_some_and(|v| parse_flag(&v)));
    }

    if section.has_children() {
        return ToggleState::Enabled;
    }

    ToggleState::NotConfigured
}

fn collect_nested(
    section: &ConfigSection<'_>,
    prefix: Option<&str>,
    toggles: &mut HashMap<String, bool>,
) {
    for child in section.children() {
        // `Enabled` switches its parent; it is not a feature of its own
        if prefix.is_some() && child.key().eq_ignore_ascii_case(ENABLED_KEY) {
            continue;
        }

        let name = match prefix {
            Some(prefix) => format!("{}.{}", prefix, child.key()),
            None => child.key().to_string(),
        };

        if let Some(enabled) = evaluate_section(&child).as_bool() {
            toggles.insert(name.clone(), enabled);
        }
        collect_nested(&child, Some(name.as_str()), toggles);
    }
}

#[async_trait]
impl ToggleProvider for ConfigToggleProvider {
    fn name(&self) -> &str {
        "configuration"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn resolve(
        &self,
        feature: &str,
        _cancel: &CancellationToken,
    ) -> FeatureResult<ToggleState> {
        let state = self.evaluate(feature);
        trace!(feature, ?state, "Evaluated configuration toggle");
        Ok(state)
    }

    async fn enumerate_all(
        &self,
        _cancel: &CancellationToken,
    ) -> FeatureResult<HashMap<String, bool>> {
        Ok(if self.nested_enumeration {
            self.enumerate_nested()
        } else {
            self.enumerate_top_level()
        })
    }
}
