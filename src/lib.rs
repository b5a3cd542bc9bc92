// flagpost - feature toggles resolved across prioritized providers
//
// This library bundles the configuration tree and the feature router
// behind a single dependency.

// Re-export the feature router
pub use flagpost_features::*;

// Re-export the configuration tree
pub use flagpost_config;
pub use flagpost_config::{ConfigTree, ConfigTreeBuilder, FileFormat};

pub use tokio_util::sync::CancellationToken;

#[cfg(feature = "logging")]
pub mod logging;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        CancellationToken, ConfigTree, ConnectionFactory, DefaultFeatureRouter, FeatureError,
        FeatureResult, FeatureRouter, FeatureToggles, MergeStrategy, ToggleProvider, ToggleState,
    };
    pub use async_trait::async_trait;
}
