//! Database-backed toggles.
//!
//! Toggles are rows of a single `FeatureToggles` table:
//!
//! | Column  | Type    | Notes                        |
//! |---------|---------|------------------------------|
//! | `Id`    | integer | identity                     |
//! | `Name`  | text    | unique, matched exactly      |
//! | `State` | integer | `0` = disabled, `1` = enabled |
//!
//! The provider never owns a connection. Each call asks the configured
//! [`ConnectionFactory`] for one and drops it before returning, so pooling
//! is entirely up to the factory.

#[cfg(feature = "sqlite")]
pub mod sqlite;

use crate::error::{FeatureResult, StoreResult};
use crate::options::FeatureToggleOptions;
use crate::provider::{DEFAULT_PRIORITY, ToggleProvider};
use crate::toggle::ToggleState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// How far the store provider sits ahead of [`DEFAULT_PRIORITY`].
pub const STORE_PRIORITY_OFFSET: i32 = 10;

/// Name of the table holding toggle records.
pub const TOGGLE_TABLE: &str = "FeatureToggles";

/// Stored state of a toggle record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum RecordState {
    Disabled = 0,
    Enabled = 1,
}

impl RecordState {
    /// Map a stored integer; anything other than `1` is disabled.
    pub fn from_i64(value: i64) -> Self {
        if value == RecordState::Enabled as i64 {
            RecordState::Enabled
        } else {
            RecordState::Disabled
        }
    }

    pub fn is_enabled(self) -> bool {
        self == RecordState::Enabled
    }
}

/// A feature toggle record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleRecord {
    pub id: i64,
    pub name: String,
    pub state: RecordState,
}

impl ToggleRecord {
    pub fn new(id: i64, name: impl Into<String>, state: RecordState) -> Self {
        Self {
            id,
            name: name.into(),
            state,
        }
    }
}

/// An open connection to the toggle table.
#[async_trait]
pub trait ToggleConnection: Send {
    /// The record whose name equals `name` exactly, if any.
    async fn find_by_name(&mut self, name: &str) -> StoreResult<Option<ToggleRecord>>;

    /// Every record in the table.
    async fn fetch_all(&mut self) -> StoreResult<Vec<ToggleRecord>>;
}

/// Opens connections to the toggle table.
///
/// Closures of the shape `Fn(CancellationToken) -> impl Future<Output =
/// StoreResult<Box<dyn ToggleConnection>>>` are factories too.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    async fn connect(&self, cancel: &CancellationToken) -> StoreResult<Box<dyn ToggleConnection>>;
}

#[async_trait]
impl<F, Fut> ConnectionFactory for F
where
    F: Fn(CancellationToken) -> Fut + Send + Sync,
    Fut: Future<Output = StoreResult<Box<dyn ToggleConnection>>> + Send,
{
    async fn connect(&self, cancel: &CancellationToken) -> StoreResult<Box<dyn ToggleConnection>> {
        (self)(cancel.clone()).await
    }
}

/// Resolves toggles from the `FeatureToggles` table.
///
/// Without a connection factory the provider is inactive: every feature is
/// `NotConfigured` and enumeration is empty.
#[derive(Clone)]
pub struct StoreToggleProvider {
    factory: Option<Arc<dyn ConnectionFactory>>,
    priority: i32,
}

impl StoreToggleProvider {
    pub fn new(options: &FeatureToggleOptions) -> Self {
        Self {
            factory: options.connection_factory.clone(),
            priority: DEFAULT_PRIORITY - STORE_PRIORITY_OFFSET,
        }
    }

    /// Provider using `factory` for every lookup
    pub fn with_factory(factory: impl ConnectionFactory + 'static) -> Self {
        Self::new(&FeatureToggleOptions::new().with_connection_factory(factory))
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Whether a connection factory is configured
    pub fn is_active(&self) -> bool {
        self.factory.is_some()
    }
}

impl std::fmt::Debug for StoreToggleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreToggleProvider")
            .field("active", &self.is_active())
            .field("priority", &self.priority)
            .finish()
    }
}

#[async_trait]
impl ToggleProvider for StoreToggleProvider {
    fn name(&self) -> &str {
        "database"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn resolve(
        &self,
        feature: &str,
        cancel: &CancellationToken,
    ) -> FeatureResult<ToggleState> {
        let Some(factory) = &self.factory else {
            trace!(feature, "No connection factory configured, skipping database toggles");
            return Ok(ToggleState::NotConfigured);
        };

        let record = {
            let mut connection = factory.connect(cancel).await?;
            connection.find_by_name(feature).await?
        };

        Ok(match record {
            Some(record) => {
                debug!(feature, state = ?record.state, "Found database toggle");
                ToggleState::from_bool(record.state.is_enabled())
            }
            None => ToggleState::NotConfigured,
        })
    }

    async fn enumerate_all(
        &self,
        cancel: &CancellationToken,
    ) -> FeatureResult<HashMap<String, bool>> {
        let Some(factory) = &self.factory else {
            return Ok(HashMap::new());
        };

        let records = {
            let mut connection = factory.connect(cancel).await?;
            connection.fetch_all().await?
        };

        Ok(records
            .into_iter()
            .map(|record| (record.name, record.state.is_enabled()))
            .collect())
    }
}
