// tests/session_flow.rs
//! A whole session against a mock registry and an on-disk store.

mod common;

use common::{names, MockRegistry};
use mcp_catalog::export::ExportDestination;
use mcp_catalog::{
    AccessKind, CatalogSession, DiskReplicaStore, ExportFormat, FilterSet, Preferences, QueryMode,
    RegistryUrl,
};
use std::sync::Arc;

async fn open(dir: &std::path::Path, registry: Arc<MockRegistry>) -> CatalogSession {
    let store = Arc::new(DiskReplicaStore::open(dir).await);
    let prefs = Preferences::load(store.as_ref()).await;
    CatalogSession::with_parts(registry, store, prefs).await
}

#[tokio::test]
async fn preferences_and_replica_persist_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(MockRegistry::paged(
        &["alpha", "beta", "gamma", "delta", "epsilon"],
        2,
    ));

    {
        let mut session = open(dir.path(), registry.clone()).await;
        session.enable_local_index(false).await.unwrap();
        session
            .set_page_size(mcp_catalog::PageSize::preference(4).unwrap())
            .await
            .unwrap();
        assert_eq!(names(session.entries()), vec!["alpha", "beta", "gamma", "delta"]);
    }
    let crawl_calls = registry.calls();

    let mut session = open(dir.path(), registry.clone()).await;
    assert_eq!(session.mode(), QueryMode::Local);
    assert_eq!(session.preferences().page_size.get(), 4);

    session.load().await.unwrap();
    session.next_page().await.unwrap();
    assert_eq!(names(session.entries()), vec!["epsilon"]);
    assert_eq!(registry.calls(), crawl_calls);
}

#[tokio::test]
async fn filters_reset_to_first_page() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(MockRegistry::paged(&["a", "b", "c", "d", "e", "f", "g"], 3));
    let mut session = open(dir.path(), registry).await;
    session.enable_local_index(false).await.unwrap();
    session
        .set_page_size(mcp_catalog::PageSize::preference(3).unwrap())
        .await
        .unwrap();
    session.go_to_page(3).await.unwrap();
    assert_eq!(session.navigator().current_page(), 3);

    session
        .set_filters(FilterSet::new().with_package("npm", false))
        .await
        .unwrap();
    assert_eq!(session.navigator().current_page(), 1);
    assert_eq!(session.navigator().total_matched(), Some(7));
}

#[tokio::test]
async fn stack_export_writes_ide_configs() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(MockRegistry::paged(&["a"], 1));
    let mut session = open(dir.path(), registry).await;

    let mut entry = common::entry("io.example/files");
    entry.server.remotes.push(mcp_catalog::Remote {
        transport_type: "streamable-http".to_string(),
        url: Some("https://files.example/mcp".to_string()),
        headers: Vec::new(),
        extra: Default::default(),
    });
    assert!(session.add_to_stack(&entry, AccessKind::Remote, 0).await);

    let out = dir.path().join("exports");
    std::fs::create_dir_all(&out).unwrap();
    for format in [ExportFormat::VsCode, ExportFormat::Cursor] {
        session
            .export(format, &[ExportDestination::File(out.clone())])
            .unwrap();
    }

    let vscode: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("mcp-settings.json")).unwrap())
            .unwrap();
    assert_eq!(vscode["servers"]["io.example/files"]["type"], "http");

    let cursor: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("cursor-config.json")).unwrap())
            .unwrap();
    assert_eq!(
        cursor["mcpServers"]["io.example/files"]["url"],
        "https://files.example/mcp"
    );
}

#[tokio::test]
async fn switching_registry_is_remembered() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path(), Arc::new(MockRegistry::paged(&["a"], 1))).await;

    let mirror = RegistryUrl::parse("https://mirror.example/v0/servers").unwrap();
    session
        .set_source(mirror.clone(), Arc::new(MockRegistry::paged(&["m1", "m2"], 5)))
        .await
        .unwrap();
    assert_eq!(names(session.entries()), vec!["m1", "m2"]);

    let store = DiskReplicaStore::open(dir.path()).await;
    assert_eq!(Preferences::load(&store).await.registry_url, mirror);
}
