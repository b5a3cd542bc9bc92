//! Feature toggles for flagpost
//!
//! Resolves boolean feature toggles by asking an ordered set of providers
//! until one of them gives a definitive answer.
//!
//! # Features
//!
//! - **Prioritized providers** - lower priority values are asked first
//! - **Configuration toggles** - `Features` section of a [`ConfigTree`](flagpost_config::ConfigTree)
//! - **Database toggles** - `FeatureToggles` table through a connection factory
//! - **SQLite store** - optional `sqlite` feature backed by `sqlx`
//!
//! # Quick Start
//!
//! ```
//! use flagpost_config::ConfigTree;
//! use flagpost_features::*;
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio_test::block_on(async {
//! let config = ConfigTree::builder()
//!     .add_json_str(r#"{"Features": {"Beta": true, "Shop": {"Cart": {"ShareCart": {}}}}}"#)
//!     .build()
//!     .unwrap();
//!
//! let router = FeatureToggles::builder().with_configuration(config).build();
//! let cancel = CancellationToken::new();
//!
//! assert!(router.is_enabled("Beta", &cancel).await.unwrap());
//! assert!(router.is_enabled("Shop.Cart", &cancel).await.unwrap());
//! assert!(!router.is_enabled("Unknown", &cancel).await.unwrap());
//! # });
//! ```
//!
//! # Precedence
//!
//! The database provider runs at priority 990 and the configuration
//! provider at 1000, so a database row overrides the configuration file for
//! the same feature. Providers returning [`ToggleState::NotConfigured`] are
//! skipped; if nobody answers, the feature is disabled.

pub mod config_provider;
pub mod error;
pub mod options;
pub mod provider;
pub mod router;
pub mod store;
pub mod toggle;

pub use config_provider::{ConfigToggleProvider, DEFAULT_ROOT_SECTION};
pub use error::{FeatureError, FeatureResult, StoreError, StoreResult};
pub use options::{FeatureToggleOptions, FeatureToggles, FeatureTogglesBuilder};
pub use provider::{DEFAULT_PRIORITY, ToggleProvider};
pub use router::{DefaultFeatureRouter, FeatureRouter, MergeStrategy};
pub use store::{
    ConnectionFactory, RecordState, STORE_PRIORITY_OFFSET, StoreToggleProvider,
    ToggleConnection, ToggleRecord,
};
pub use toggle::{ToggleState, parse_flag};

#[cfg(feature = "sqlite")]
pub use store::sqlite::{SqliteConnectionFactory, SqliteStoreConfig};

// Re-export sqlx for callers managing the toggle table themselves
#[cfg(feature = "sqlite")]
pub use sqlx;
