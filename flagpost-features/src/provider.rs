//! Toggle provider trait definition.

use crate::error::FeatureResult;
use crate::toggle::ToggleState;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// Priority of providers that do not override it. Lower values are asked first.
pub const DEFAULT_PRIORITY: i32 = 1000;

/// A single source of toggle truth.
///
/// Providers only answer for their own data. Combining several providers is
/// the router's job.
#[async_trait]
pub trait ToggleProvider: Send + Sync {
    /// Short label used in logs and error context.
    fn name(&self) -> &str;

    /// Evaluation priority; lower values are consulted first.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Resolve a feature against this provider only.
    ///
    /// # Returns
    ///
    /// `ToggleState::NotConfigured` when the provider does not know the
    /// feature. Errors are reserved for infrastructure failures and must not
    /// be folded into `NotConfigured`.
    async fn resolve(&self, feature: &str, cancel: &CancellationToken)
    -> FeatureResult<ToggleState>;

    /// Every toggle this provider can resolve, keyed by feature name.
    async fn enumerate_all(&self, cancel: &CancellationToken)
    -> FeatureResult<HashMap<String, bool>>;
}
