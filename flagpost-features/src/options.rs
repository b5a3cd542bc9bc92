//! Options and registration.
//!
//! [`FeatureToggles::builder`] is the composition root: it wires the
//! database and configuration providers plus any extra providers into a
//! [`DefaultFeatureRouter`].

use crate::config_provider::ConfigToggleProvider;
use crate::provider::ToggleProvider;
use crate::router::{DefaultFeatureRouter, MergeStrategy};
use crate::store::{ConnectionFactory, StoreToggleProvider};
use flagpost_config::ConfigTree;
use std::sync::Arc;
use tracing::info;

/// Options for the built-in providers.
#[derive(Clone, Default)]
pub struct FeatureToggleOptions {
    /// Factory for toggle store connections. `None` disables database toggles.
    pub connection_factory: Option<Arc<dyn ConnectionFactory>>,
}

impl FeatureToggleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connection_factory(mut self, factory: impl ConnectionFactory + 'static) -> Self {
        self.connection_factory = Some(Arc::new(factory));
        self
    }
}

impl std::fmt::Debug for FeatureToggleOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureToggleOptions")
            .field("connection_factory", &self.connection_factory.is_some())
            .finish()
    }
}

/// Entry point for wiring feature toggles.
pub struct FeatureToggles;

impl FeatureToggles {
    pub fn builder() -> FeatureTogglesBuilder {
        FeatureTogglesBuilder::new()
    }
}

/// Builder for a [`DefaultFeatureRouter`].
///
/// Providers are registered as database, configuration, then extras in the
/// order they were added. Evaluation order is decided by priority.
#[derive(Default)]
pub struct FeatureTogglesBuilder {
    options: FeatureToggleOptions,
    configuration: Option<ConfigToggleProvider>,
    providers: Vec<Arc<dyn ToggleProvider>>,
    merge_strategy: MergeStrategy,
}

impl FeatureTogglesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read toggles from the `Features` section of `config`
    pub fn with_configuration(self, config: impl Into<Arc<ConfigTree>>) -> Self {
        self.with_configuration_provider(ConfigToggleProvider::new(config))
    }

    /// Use a customised configuration provider
    pub fn with_configuration_provider(mut self, provider: ConfigToggleProvider) -> Self {
        self.configuration = Some(provider);
        self
    }

    /// Read toggles from the database through `factory`
    pub fn with_connection_factory(mut self, factory: impl ConnectionFactory + 'static) -> Self {
        self.options = self.options.with_connection_factory(factory);
        self
    }

    /// Adjust options in place
    pub fn configure(mut self, configure: impl FnOnce(&mut FeatureToggleOptions)) -> Self {
        configure(&mut self.options);
        self
    }

    /// Register an additional provider
    pub fn add_provider(self, provider: impl ToggleProvider + 'static) -> Self {
        self.add_shared_provider(Arc::new(provider))
    }

    /// Register an already shared provider
    pub fn add_shared_provider(mut self, provider: Arc<dyn ToggleProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.merge_strategy = strategy;
        self
    }

    pub fn build(self) -> DefaultFeatureRouter {
        let mut providers: Vec<Arc<dyn ToggleProvider>> =
            vec![Arc::new(StoreToggleProvider::new(&self.options))];
        if let Some(configuration) = self.configuration {
            providers.push(Arc::new(configuration));
        }
        providers.extend(self.providers);

        info!(
            providers = providers.len(),
            database = self.options.connection_factory.is_some(),
            "Feature toggles configured"
        );

        DefaultFeatureRouter::new(providers).with_merge_strategy(self.merge_strategy)
    }
}
