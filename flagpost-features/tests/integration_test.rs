//! Integration tests for flagpost-features

use async_trait::async_trait;
use flagpost_config::ConfigTree;
use flagpost_features::*;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

// =============================================================================
// In-memory toggle store
// =============================================================================

#[derive(Clone, Default)]
struct MemoryStore {
    records: Vec<ToggleRecord>,
    connects: Arc<AtomicUsize>,
}

impl MemoryStore {
    fn with(mut self, name: &str, state: RecordState) -> Self {
        let id = self.records.len() as i64 + 1;
        self.records.push(ToggleRecord::new(id, name, state));
        self
    }

    fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

struct MemoryConnection(Vec<ToggleRecord>);

#[async_trait]
impl ToggleConnection for MemoryConnection {
    async fn find_by_name(&mut self, name: &str) -> StoreResult<Option<ToggleRecord>> {
        Ok(self.0.iter().find(|r| r.name == name).cloned())
    }

    async fn fetch_all(&mut self) -> StoreResult<Vec<ToggleRecord>> {
        Ok(self.0.clone())
    }
}

#[async_trait]
impl ConnectionFactory for MemoryStore {
    async fn connect(&self, _cancel: &CancellationToken) -> StoreResult<Box<dyn ToggleConnection>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryConnection(self.records.clone())))
    }
}

struct UnreachableStore;

#[async_trait]
impl ConnectionFactory for UnreachableStore {
    async fn connect(&self, _cancel: &CancellationToken) -> StoreResult<Box<dyn ToggleConnection>> {
        Err(StoreError::Connection("connection refused".to_string()))
    }
}

fn config(value: serde_json::Value) -> ConfigTree {
    ConfigTree::from_value(value).unwrap()
}

// =============================================================================
// Resolution
// =============================================================================

#[tokio::test]
async fn test_unknown_feature_is_disabled() {
    let router = FeatureToggles::builder()
        .with_configuration(config(json!({"Features": {"Beta": true}})))
        .with_connection_factory(MemoryStore::default())
        .build();

    assert!(!router.is_enabled("Nope", &CancellationToken::new()).await.unwrap());
}

#[tokio::test]
async fn test_database_overrides_configuration() {
    let store = MemoryStore::default().with("X", RecordState::Disabled);
    let router = FeatureToggles::builder()
        .with_configuration(config(json!({"Features": {"X": true, "Y": true}})))
        .with_connection_factory(store.clone())
        .build();
    let cancel = CancellationToken::new();

    assert!(!router.is_enabled("X", &cancel).await.unwrap());
    // not in the database, falls through to configuration
    assert!(router.is_enabled("Y", &cancel).await.unwrap());
    assert_eq!(store.connects(), 2);
}

#[tokio::test]
async fn test_database_name_match_is_case_sensitive() {
    let store = MemoryStore::default().with("Beta", RecordState::Enabled);
    let router = FeatureToggles::builder()
        .with_connection_factory(store)
        .build();
    let cancel = CancellationToken::new();

    assert!(router.is_enabled("Beta", &cancel).await.unwrap());
    assert!(!router.is_enabled("beta", &cancel).await.unwrap());
}

#[tokio::test]
async fn test_nested_configuration_features() {
    let router = FeatureToggles::builder()
        .with_configuration(config(json!({
            "Features": {
                "Shop": {
                    "Cart": {"ShareCart": {}},
                    "Checkout": {"Enabled": false, "Express": {}}
                },
                "Beta": "not-a-bool"
            }
        })))
        .build();
    let cancel = CancellationToken::new();

    assert!(router.is_enabled("Shop.Cart", &cancel).await.unwrap());
    assert!(!router.is_enabled("Shop.Checkout", &cancel).await.unwrap());
    assert!(!router.is_enabled("Beta", &cancel).await.unwrap());
}

#[tokio::test]
async fn test_store_failure_is_not_disabled() {
    let router = FeatureToggles::builder()
        .with_configuration(config(json!({"Features": {"Beta": true}})))
        .with_connection_factory(UnreachableStore)
        .build();

    let err = router
        .is_enabled("Beta", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, FeatureError::Store(StoreError::Connection(_))));
}

#[tokio::test]
async fn test_empty_name_never_reaches_the_store() {
    let store = MemoryStore::default();
    let router = FeatureToggles::builder()
        .with_connection_factory(store.clone())
        .build();

    let err = router
        .is_enabled("", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, FeatureError::InvalidFeatureName));
    assert_eq!(store.connects(), 0);
}

#[tokio::test]
async fn test_factory_cancellation_surfaces_as_cancelled() {
    let started = Arc::new(Notify::new());
    let router = FeatureToggles::builder()
        .with_connection_factory({
            let started = started.clone();
            move |cancel: CancellationToken| {
                let started = started.clone();
                async move {
                    started.notify_one();
                    cancel.cancelled().await;
                    Err::<Box<dyn ToggleConnection>, _>(StoreError::Cancelled)
                }
            }
        })
        .build();
    let cancel = CancellationToken::new();

    let pending = {
        let router = router.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { router.is_enabled("Beta", &cancel).await })
    };

    // the store provider is now waiting inside the factory
    started.notified().await;
    cancel.cancel();

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, FeatureError::Cancelled));
}

#[tokio::test]
async fn test_names_with_empty_segments_are_disabled() {
    let router = FeatureToggles::builder()
        .with_configuration(config(json!({"Features": {"Beta": true, "Shop": {"Cart": true}}})))
        .build();
    let cancel = CancellationToken::new();

    for name in [".", "..", "Beta.", ".Beta", "Shop..Cart"] {
        assert!(!router.is_enabled(name, &cancel).await.unwrap(), "{name}");
    }
    assert!(router.is_enabled("Shop.Cart", &cancel).await.unwrap());
}

// =============================================================================
// Custom providers
// =============================================================================

struct EnvironmentProvider {
    enabled: HashMap<String, bool>,
}

#[async_trait]
impl ToggleProvider for EnvironmentProvider {
    fn name(&self) -> &str {
        "environment"
    }

    fn priority(&self) -> i32 {
        500
    }

    async fn resolve(
        &self,
        feature: &str,
        _cancel: &CancellationToken,
    ) -> FeatureResult<ToggleState> {
        Ok(self.enabled.get(feature).copied().into())
    }

    async fn enumerate_all(
        &self,
        _cancel: &CancellationToken,
    ) -> FeatureResult<HashMap<String, bool>> {
        Ok(self.enabled.clone())
    }
}

#[tokio::test]
async fn test_custom_provider_takes_precedence_by_priority() {
    let store = MemoryStore::default().with("Beta", RecordState::Disabled);
    let router = FeatureToggles::builder()
        .with_connection_factory(store.clone())
        .add_provider(EnvironmentProvider {
            enabled: HashMap::from([("Beta".to_string(), true)]),
        })
        .build();

    assert!(router.is_enabled("Beta", &CancellationToken::new()).await.unwrap());
    assert_eq!(store.connects(), 0);
}

// =============================================================================
// Enumeration
// =============================================================================

#[tokio::test]
async fn test_get_all_default_merge_lets_configuration_win() {
    let store = MemoryStore::default()
        .with("Foo", RecordState::Disabled)
        .with("DbOnly", RecordState::Enabled);
    let router = FeatureToggles::builder()
        .with_configuration(config(json!({"Features": {"Foo": true}})))
        .with_connection_factory(store)
        .build();

    let all = router.get_all(&CancellationToken::new()).await.unwrap();

    // database (990) is applied first, configuration (1000) overwrites it
    assert_eq!(all["Foo"], true);
    assert_eq!(all["DbOnly"], true);
}

#[tokio::test]
async fn test_get_all_highest_priority_lets_database_win() {
    let store = MemoryStore::default().with("Foo", RecordState::Disabled);
    let router = FeatureToggles::builder()
        .with_configuration(config(json!({"Features": {"Foo": true, "Bar": "true"}})))
        .with_connection_factory(store)
        .merge_strategy(MergeStrategy::HighestPriority)
        .build();

    let all = router.get_all(&CancellationToken::new()).await.unwrap();

    assert_eq!(all["Foo"], false);
    assert_eq!(all["Bar"], true);
}

#[tokio::test]
async fn test_get_all_without_factory_has_configuration_only() {
    let router = FeatureToggles::builder()
        .with_configuration(config(json!({"Features": {"Foo": true, "Shop": {"Cart": true}}})))
        .build();

    let all = router.get_all(&CancellationToken::new()).await.unwrap();

    let expected = HashMap::from([("Foo".to_string(), true), ("Shop".to_string(), false)]);
    assert_eq!(all, expected);
}

#[tokio::test]
async fn test_get_all_nested_configuration() {
    let provider = ConfigToggleProvider::new(config(json!({
        "Features": {"Shop": {"Cart": {"Enabled": false}}}
    })))
    .with_nested_enumeration(true);
    let router = FeatureToggles::builder()
        .with_configuration_provider(provider)
        .build();

    let all = router.get_all(&CancellationToken::new()).await.unwrap();

    let expected = HashMap::from([("Shop".to_string(), true), ("Shop.Cart".to_string(), false)]);
    assert_eq!(all, expected);
}

#[tokio::test]
async fn test_concurrent_resolution() {
    let router = Arc::new(
        FeatureToggles::builder()
            .with_configuration(config(json!({"Features": {"Beta": true}})))
            .with_connection_factory(MemoryStore::default().with("Gamma", RecordState::Enabled))
            .build(),
    );

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let router = router.clone();
            tokio::spawn(async move {
                let feature = if i % 2 == 0 { "Beta" } else { "Gamma" };
                router.is_enabled(feature, &CancellationToken::new()).await
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().unwrap());
    }
}
