//! SmartSearch-RS: a hardened search router written in Rust
//!
//! This is the main entry point for the application.

use anyhow::Result;
use smartsearch_rs::{
    assets::{Asset, MemoryAssetStore},
    config::Settings,
    limiter::MemoryKvStore,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!("Starting SmartSearch-RS v{}", smartsearch_rs::VERSION);

    // Load configuration
    let settings = load_settings()?;
    info!(
        "Loaded configuration for instance: {}",
        settings.general.instance_name
    );

    // Inject the rate-limit store and asset-store bindings. Multi-instance
    // deployments swap these for shared durable implementations.
    let store = Arc::new(MemoryKvStore::default());
    let assets = Arc::new(seed_assets(&settings));

    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);

    // Create application state and router
    let state = AppState::new(settings, store, assets);
    let app = create_router(state);

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Load settings from file or use defaults
fn load_settings() -> Result<Settings> {
    let paths = [
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        PathBuf::from("/etc/smartsearch/settings.yml"),
        dirs::config_dir()
            .map(|p| p.join("smartsearch-rs/settings.yml"))
            .unwrap_or_default(),
    ];

    // Check environment variable first
    if let Ok(path) = std::env::var("SMARTSEARCH_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(&path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    // Try each default path
    for path in paths.iter() {
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    // Use defaults
    info!("No settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}

/// Seed the asset collaborator with the pages this binary ships: the
/// OpenSearch descriptor and a minimal settings page. Real deployments
/// bind an external asset store instead.
fn seed_assets(settings: &Settings) -> MemoryAssetStore {
    let origin = settings
        .server
        .base_url
        .clone()
        .unwrap_or_else(|| {
            format!(
                "http://{}:{}",
                settings.server.bind_address, settings.server.port
            )
        });

    let mut store = MemoryAssetStore::new();

    store.insert(
        "/opensearch.xml",
        Asset::new(
            "application/opensearchdescription+xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<OpenSearchDescription xmlns="http://a9.com/-/spec/opensearch/1.1/">
  <ShortName>SmartSearch</ShortName>
  <Description>Smart search router that automatically chooses the best search engine based on your query</Description>
  <InputEncoding>UTF-8</InputEncoding>
  <OutputEncoding>UTF-8</OutputEncoding>
  <Url type="text/html" method="get" template="{origin}/search?q={{searchTerms}}"/>
  <Url type="application/x-suggestions+json" method="get" template="{origin}/suggest?q={{searchTerms}}"/>
</OpenSearchDescription>"#
            ),
        ),
    );

    store.insert(
        "/",
        Asset::new(
            "text/html;charset=UTF-8",
            format!(
                r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>SmartSearch</title></head>
<body>
<h1>SmartSearch</h1>
<form action="{origin}/search" method="get">
  <input type="search" name="q" autofocus>
  <button type="submit">Search</button>
</form>
<p>Questions go to an answer engine, keywords to a search engine.</p>
</body>
</html>"#
            ),
        ),
    );

    store.insert(
        "/robots.txt",
        Asset::new("text/plain", "User-agent: *\nDisallow: /search\n"),
    );

    store
}
