//! Feature router
//!
//! Asks providers in priority order and owns the precedence rules.

use crate::error::{FeatureError, FeatureResult};
use crate::provider::ToggleProvider;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// How [`FeatureRouter::get_all`] resolves a feature known to several providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Every provider's map overwrites the accumulator in priority order, so
    /// the lowest-priority provider that knows a feature wins.
    #[default]
    LastApplied,

    /// The highest-priority provider that knows a feature wins, matching
    /// [`FeatureRouter::is_enabled`].
    HighestPriority,
}

/// Entry point for application code.
#[async_trait]
pub trait FeatureRouter: Send + Sync {
    /// Whether `feature` is enabled.
    ///
    /// Nested features are addressed with dots, e.g. `Shop.Cart.ShareCart`.
    /// Features no provider knows are disabled.
    async fn is_enabled(&self, feature: &str, cancel: &CancellationToken) -> FeatureResult<bool>;

    /// Every toggle known to any provider.
    async fn get_all(&self, cancel: &CancellationToken) -> FeatureResult<HashMap<String, bool>>;
}

/// Router over an explicit list of providers.
///
/// Providers are sorted by [`ToggleProvider::priority`] once, at
/// construction. Ties keep their registration order.
#[derive(Clone)]
pub struct DefaultFeatureRouter {
    providers: Vec<Arc<dyn ToggleProvider>>,
    merge_strategy: MergeStrategy,
}

impl DefaultFeatureRouter {
    pub fn new(mut providers: Vec<Arc<dyn ToggleProvider>>) -> Self {
        // stable sort keeps registration order for equal priorities
        providers.sort_by_key(|provider| provider.priority());
        Self {
            providers,
            merge_strategy: MergeStrategy::default(),
        }
    }

    pub fn with_merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.merge_strategy = strategy;
        self
    }

    /// Providers in evaluation order
    pub fn providers(&self) -> &[Arc<dyn ToggleProvider>] {
        &self.providers
    }

    pub fn merge_strategy(&self) -> MergeStrategy {
        self.merge_strategy
    }
}

impl std::fmt::Debug for DefaultFeatureRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let providers: Vec<(&str, i32)> = self
            .providers
            .iter()
            .map(|p| (p.name(), p.priority()))
            .collect();
        f.debug_struct("DefaultFeatureRouter")
            .field("providers", &providers)
            .field("merge_strategy", &self.merge_strategy)
            .finish()
    }
}

#[async_trait]
impl FeatureRouter for DefaultFeatureRouter {
    async fn is_enabled(&self, feature: &str, cancel: &CancellationToken) -> FeatureResult<bool> {
        if feature.is_empty() {
            return Err(FeatureError::InvalidFeatureName);
        }

        for provider in &self.providers {
            if cancel.is_cancelled() {
                return Err(FeatureError::Cancelled);
            }

            let state = provider.resolve(feature, cancel).await.inspect_err(|e| {
                warn!(feature, provider = provider.name(), error = %e, "Toggle provider failed");
            })?;

            if let Some(enabled) = state.as_bool() {
                debug!(
                    feature,
                    provider = provider.name(),
                    priority = provider.priority(),
                    enabled,
                    "Resolved feature toggle"
                );
                return Ok(enabled);
            }
            trace!(feature, provider = provider.name(), "Feature not configured by provider");
        }

        debug!(feature, "Feature not configured by any provider, treating as disabled");
        Ok(false)
    }

    async fn get_all(&self, cancel: &CancellationToken) -> FeatureResult<HashMap<String, bool>> {
        let mut toggles = HashMap::new();

        for provider in &self.providers {
            if cancel.is_cancelled() {
                return Err(FeatureError::Cancelled);
            }

            let provided = provider.enumerate_all(cancel).await.inspect_err(|e| {
                warn!(provider = provider.name(), error = %e, "Toggle enumeration failed");
            })?;
            trace!(provider = provider.name(), count = provided.len(), "Enumerated toggles");

            match self.merge_strategy {
                MergeStrategy::LastApplied => toggles.extend(provided),
                MergeStrategy::HighestPriority => {
                    for (feature, enabled) in provided {
                        toggles.entry(feature).or_insert(enabled);
                    }
                }
            }
        }

        Ok(toggles)
    }
}
