//! User preferences persisted through the replica store's settings.
//!
//! Each preference is its own key, written independently (last write wins).
//! A missing or invalid stored value falls back to the default.

use crate::constants::{
    SETTING_REGISTRY_URL, SETTING_RESULTS_PER_PAGE, SETTING_STACK, SETTING_USE_LOCAL_INDEX,
};
use crate::stack::Stack;
use crate::store::ReplicaStore;
use crate::types::{PageSize, RegistryUrl};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preferences {
    pub registry_url: RegistryUrl,
    pub page_size: PageSize,
    pub use_local_index: bool,
    pub stack: Stack,
}

impl Preferences {
    pub async fn load(store: &dyn ReplicaStore) -> Self {
        let mut prefs = Self::default();

        if let Some(value) = store.get_setting(SETTING_REGISTRY_URL).await {
            match value.as_str().map(RegistryUrl::parse) {
                Some(Ok(url)) => prefs.registry_url = url,
                _ => log::warn!("Ignoring invalid saved registry URL: {}", value),
            }
        }

        if let Some(value) = store.get_setting(SETTING_RESULTS_PER_PAGE).await {
            match parse_page_size(&value) {
                Some(size) => prefs.page_size = size,
                None => log::warn!("Ignoring invalid saved page size: {}", value),
            }
        }

        if let Some(value) = store.get_setting(SETTING_USE_LOCAL_INDEX).await {
            match value.as_bool() {
                Some(flag) => prefs.use_local_index = flag,
                None => log::warn!("Ignoring invalid saved local index flag: {}", value),
            }
        }

        if let Some(value) = store.get_setting(SETTING_STACK).await {
            match serde_json::from_value::<Stack>(value) {
                Ok(stack) => prefs.stack = stack,
                Err(e) => log::warn!("Failed to parse saved stack: {}", e),
            }
        }

        log::debug!(
            "Loaded preferences: registry {}, {} per page, local index {}, {} stack item(s)",
            prefs.registry_url,
            prefs.page_size,
            prefs.use_local_index,
            prefs.stack.len()
        );
        prefs
    }

    pub async fn save_registry_url(store: &dyn ReplicaStore, url: &RegistryUrl) {
        store
            .set_setting(SETTING_REGISTRY_URL, Value::String(url.as_str().to_string()))
            .await;
    }

    pub async fn save_page_size(store: &dyn ReplicaStore, page_size: PageSize) {
        store
            .set_setting(SETTING_RESULTS_PER_PAGE, Value::from(page_size.get()))
            .await;
    }

    pub async fn save_use_local_index(store: &dyn ReplicaStore, enabled: bool) {
        store
            .set_setting(SETTING_USE_LOCAL_INDEX, Value::Bool(enabled))
            .await;
    }

    pub async fn save_stack(store: &dyn ReplicaStore, stack: &Stack) {
        match serde_json::to_value(stack) {
            Ok(value) => store.set_setting(SETTING_STACK, value).await,
            Err(e) => log::warn!("Failed to encode stack: {}", e),
        }
    }
}

/// Accepts a number or a numeric string within the preference bounds.
fn parse_page_size(value: &Value) -> Option<PageSize> {
    let raw = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    PageSize::preference(u32::try_from(raw).ok()?).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryReplicaStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn defaults_when_nothing_saved() {
        let store = MemoryReplicaStore::new();
        let prefs = Preferences::load(&store).await;
        assert_eq!(prefs, Preferences::default());
        assert_eq!(
            prefs.registry_url.as_str(),
            "https://registry.modelcontextprotocol.io/v0/servers"
        );
        assert_eq!(prefs.page_size.get(), 60);
        assert!(!prefs.use_local_index);
    }

    #[tokio::test]
    async fn saved_values_are_loaded() {
        let store = MemoryReplicaStore::new();
        let url = RegistryUrl::parse("https://mirror.example/v0/servers").unwrap();
        Preferences::save_registry_url(&store, &url).await;
        Preferences::save_page_size(&store, PageSize::preference(25).unwrap()).await;
        Preferences::save_use_local_index(&store, true).await;

        let prefs = Preferences::load(&store).await;
        assert_eq!(prefs.registry_url, url);
        assert_eq!(prefs.page_size.get(), 25);
        assert!(prefs.use_local_index);
    }

    #[tokio::test]
    async fn invalid_values_fall_back_to_defaults() {
        let store = MemoryReplicaStore::new();
        store.set_setting(SETTING_REGISTRY_URL, json!("not a url")).await;
        store.set_setting(SETTING_RESULTS_PER_PAGE, json!(2)).await;
        store.set_setting(SETTING_USE_LOCAL_INDEX, json!("yes")).await;
        store.set_setting(SETTING_STACK, json!({"broken": true})).await;

        assert_eq!(Preferences::load(&store).await, Preferences::default());
    }

    #[test]
    fn page_size_accepts_numeric_strings() {
        assert_eq!(parse_page_size(&json!("30")).map(PageSize::get), Some(30));
        assert_eq!(parse_page_size(&json!(101)), None);
        assert_eq!(parse_page_size(&json!(-4)), None);
    }
}
