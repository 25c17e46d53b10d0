//! One browsing session: the explicit context every operation runs in.
//!
//! Owns the catalog source, the replica store, the query engine, the page
//! navigator and the loaded preferences. Nothing here is global; two
//! sessions over different stores do not see each other.

use crate::api::{CatalogSource, PageQuery, RegistryHttpClient};
use crate::config::CatalogConfig;
use crate::error::AppError;
use crate::export::{plan_export, ExportDestination, ExportFormat};
use crate::index::{BuildOutcome, FilterSet, QueryEngine, QueryMode, QueryParams, ReplicaBuilder};
use crate::model::{AccessKind, Entry};
use crate::output::{deliver_all, OutputReport};
use crate::pagination::{NavigationOutcome, PageNavigator};
use crate::settings::Preferences;
use crate::stack::{ItemConfig, Stack, StackItem};
use crate::store::{DiskReplicaStore, MemoryReplicaStore, ReplicaInfo, ReplicaStore};
use crate::types::{PageSize, RegistryUrl};
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct CatalogSession {
    store: Arc<dyn ReplicaStore>,
    engine: QueryEngine,
    navigator: PageNavigator,
    prefs: Preferences,
}

impl CatalogSession {
    /// Opens the configured store, loads preferences and connects to the
    /// registry. Does not fetch anything yet.
    pub async fn open(config: &CatalogConfig) -> Result<Self, AppError> {
        let store: Arc<dyn ReplicaStore> = if config.persist {
            let disk = DiskReplicaStore::open(&config.data_dir).await;
            if disk.is_available() {
                Arc::new(disk)
            } else {
                Arc::new(MemoryReplicaStore::new())
            }
        } else {
            log::debug!("Persistence disabled, using in-memory store");
            Arc::new(MemoryReplicaStore::new())
        };

        let mut prefs = Preferences::load(store.as_ref()).await;
        if let Some(url) = &config.registry_url {
            if *url != prefs.registry_url {
                Preferences::save_registry_url(store.as_ref(), url).await;
                prefs.registry_url = url.clone();
            }
        }

        let source = Arc::new(RegistryHttpClient::new(prefs.registry_url.clone())?);
        Ok(Self::with_parts(source, store, prefs).await)
    }

    /// Assembles a session from existing parts.
    ///
    /// A saved preference for local mode is ignored while the store holds no
    /// replica.
    pub async fn with_parts(
        source: Arc<dyn CatalogSource>,
        store: Arc<dyn ReplicaStore>,
        prefs: Preferences,
    ) -> Self {
        let mode = if prefs.use_local_index && store.has_entries().await {
            QueryMode::Local
        } else {
            if prefs.use_local_index {
                log::warn!("Local index enabled but no replica found, using the registry");
            }
            QueryMode::Remote
        };
        let params = QueryParams::new(mode, prefs.page_size);
        Self {
            engine: QueryEngine::new(source, Arc::clone(&store)),
            navigator: PageNavigator::new(params),
            store,
            prefs,
        }
    }

    pub fn navigator(&self) -> &PageNavigator {
        &self.navigator
    }

    pub fn params(&self) -> &QueryParams {
        self.navigator.params()
    }

    pub fn mode(&self) -> QueryMode {
        self.navigator.mode()
    }

    pub fn entries(&self) -> &[Entry] {
        self.navigator.entries()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn stack(&self) -> &Stack {
        &self.prefs.stack
    }

    pub fn registry_url(&self) -> &RegistryUrl {
        &self.prefs.registry_url
    }

    pub async fn replica_info(&self) -> Option<ReplicaInfo> {
        self.store.replica_info().await
    }

    /// Loads page 1 of the current query.
    pub async fn load(&mut self) -> Result<NavigationOutcome, AppError> {
        self.navigator.load(&mut self.engine).await
    }

    /// Runs a new query from page 1.
    ///
    /// Switching to local mode builds the replica first if there is none.
    /// Page size and mode are remembered once the first page arrives.
    pub async fn query(&mut self, params: QueryParams) -> Result<NavigationOutcome, AppError> {
        if params.mode == QueryMode::Local && !self.store.has_entries().await {
            self.crawl_into_store(false).await?;
        }
        let outcome = self
            .navigator
            .change_query(&mut self.engine, params.clone())
            .await?;
        self.remember(&params).await;
        Ok(outcome)
    }

    async fn remember(&mut self, params: &QueryParams) {
        if params.page_size != self.prefs.page_size {
            Preferences::save_page_size(self.store.as_ref(), params.page_size).await;
            self.prefs.page_size = params.page_size;
        }
        let use_local = params.mode == QueryMode::Local;
        if use_local != self.prefs.use_local_index {
            Preferences::save_use_local_index(self.store.as_ref(), use_local).await;
            self.prefs.use_local_index = use_local;
        }
    }

    pub async fn set_search(&mut self, search: &str) -> Result<NavigationOutcome, AppError> {
        let params = self.params().clone().with_search(search.trim());
        self.query(params).await
    }

    pub async fn set_updated_since(
        &mut self,
        updated_since: Option<DateTime<Utc>>,
    ) -> Result<NavigationOutcome, AppError> {
        let params = self.params().clone().with_updated_since(updated_since);
        self.query(params).await
    }

    pub async fn set_filters(&mut self, filters: FilterSet) -> Result<NavigationOutcome, AppError> {
        let params = self.params().clone().with_filters(filters);
        self.query(params).await
    }

    pub async fn set_page_size(&mut self, page_size: PageSize) -> Result<NavigationOutcome, AppError> {
        let params = QueryParams {
            page_size,
            ..self.params().clone()
        };
        self.query(params).await
    }

    pub async fn set_use_local_index(
        &mut self,
        enabled: bool,
    ) -> Result<NavigationOutcome, AppError> {
        let mode = if enabled {
            QueryMode::Local
        } else {
            QueryMode::Remote
        };
        let params = QueryParams {
            mode,
            ..self.params().clone()
        };
        self.query(params).await
    }

    /// Points the session at another registry and reloads page 1.
    pub async fn set_registry_url(&mut self, url: RegistryUrl) -> Result<NavigationOutcome, AppError> {
        let client = RegistryHttpClient::new(url.clone())?;
        self.set_source(url, Arc::new(client)).await
    }

    /// Like [`CatalogSession::set_registry_url`] with a ready-made source.
    pub async fn set_source(
        &mut self,
        url: RegistryUrl,
        source: Arc<dyn CatalogSource>,
    ) -> Result<NavigationOutcome, AppError> {
        Preferences::save_registry_url(self.store.as_ref(), &url).await;
        self.prefs.registry_url = url;
        self.engine.replace_source(source);
        let params = self.params().clone();
        self.query(params).await
    }

    /// Crawls the registry into the store unless a replica exists and
    /// `force` is false.
    ///
    /// When a new replica lands while local results are on screen, the
    /// current query is run again from page 1 against it.
    pub async fn build_replica(&mut self, force: bool) -> Result<BuildOutcome, AppError> {
        let outcome = self.crawl_into_store(force).await?;
        let replaced = matches!(outcome, BuildOutcome::Built { .. });
        if replaced && self.mode() == QueryMode::Local && self.navigator.is_loaded() {
            let params = self.params().clone();
            self.navigator
                .change_query(&mut self.engine, params)
                .await?;
        }
        Ok(outcome)
    }

    async fn crawl_into_store(&mut self, force: bool) -> Result<BuildOutcome, AppError> {
        let builder = ReplicaBuilder::new(Arc::clone(self.engine.source()), Arc::clone(&self.store));
        let outcome = builder.build(force).await?;
        if let BuildOutcome::Built { entries, pages } = &outcome {
            log::info!("Replica built: {} servers in {} page(s)", entries, pages);
            self.engine.invalidate();
        }
        Ok(outcome)
    }

    /// Builds (or refreshes, with `force`) the replica and switches to
    /// local mode.
    pub async fn enable_local_index(&mut self, force: bool) -> Result<BuildOutcome, AppError> {
        let outcome = self.crawl_into_store(force).await?;
        let params = QueryParams {
            mode: QueryMode::Local,
            ..self.params().clone()
        };
        self.query(params).await?;
        Ok(outcome)
    }

    pub async fn next_page(&mut self) -> Result<NavigationOutcome, AppError> {
        self.navigator.next(&mut self.engine).await
    }

    pub async fn previous_page(&mut self) -> Result<NavigationOutcome, AppError> {
        self.navigator.previous(&mut self.engine).await
    }

    pub async fn go_to_page(&mut self, page: usize) -> Result<NavigationOutcome, AppError> {
        self.navigator.go_to_page(&mut self.engine, page).await
    }

    /// Finds a server by exact name: in the replica when there is one,
    /// otherwise by searching the registry.
    pub async fn find_entry(&self, name: &str) -> Result<Option<Entry>, AppError> {
        if self.store.has_entries().await {
            return Ok(self
                .store
                .get_all_entries()
                .await
                .into_iter()
                .find(|e| e.name() == name));
        }
        let query = PageQuery {
            search: name.to_string(),
            ..PageQuery::first(PageSize::crawl())
        };
        let page = self.engine.source().fetch_page(&query).await?;
        Ok(page.entries.into_iter().find(|e| e.name() == name))
    }

    /// Adds the `index`th access point of `kind` of `entry` to the stack.
    ///
    /// Returns false if the entry has no such access point or it is already
    /// on the stack.
    pub async fn add_to_stack(&mut self, entry: &Entry, kind: AccessKind, index: usize) -> bool {
        let Some(item) = StackItem::from_entry(entry, kind, index) else {
            return false;
        };
        let added = self.prefs.stack.add(item);
        if added {
            self.save_stack().await;
        }
        added
    }

    pub async fn remove_from_stack(&mut self, server_name: &str, kind: AccessKind, index: usize) -> bool {
        let removed = self.prefs.stack.remove(server_name, kind, index);
        if removed {
            self.save_stack().await;
        }
        removed
    }

    /// Saves user settings on a stack item, merged over earlier ones.
    ///
    /// Returns false when the item is not on the stack.
    pub async fn configure_stack_item(
        &mut self,
        server_name: &str,
        kind: AccessKind,
        index: usize,
        config: ItemConfig,
    ) -> Result<bool, AppError> {
        let configured = self
            .prefs
            .stack
            .configure(server_name, kind, index, config)?;
        if configured {
            self.save_stack().await;
        }
        Ok(configured)
    }

    pub async fn reset_stack_item_config(
        &mut self,
        server_name: &str,
        kind: AccessKind,
        index: usize,
    ) -> bool {
        let reset = self.prefs.stack.reset_config(server_name, kind, index);
        if reset {
            self.save_stack().await;
        }
        reset
    }

    pub async fn clear_stack(&mut self) {
        self.prefs.stack.clear();
        self.save_stack().await;
    }

    async fn save_stack(&self) {
        Preferences::save_stack(self.store.as_ref(), &self.prefs.stack).await;
    }

    /// Renders the stack for `format` and delivers it everywhere asked.
    pub fn export(
        &self,
        format: ExportFormat,
        destinations: &[ExportDestination],
    ) -> Result<OutputReport, AppError> {
        let plan = plan_export(&self.prefs.stack, format, destinations)?;
        deliver_all(plan)
    }
}
