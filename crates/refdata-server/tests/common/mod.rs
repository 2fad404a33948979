#![allow(dead_code)]

use std::sync::Arc;

use refdata_db_memory::InMemoryStore;
use refdata_server::config::StorageBackend;
use refdata_server::{AppConfig, AppState, LocalCacheMirror, build_app};
use refdata_storage::DynStore;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// A server on an ephemeral port over an in-memory store.
pub struct TestServer {
    pub base: String,
    pub api: String,
    pub store: DynStore,
    pub cache: Arc<LocalCacheMirror>,
    pub documents: TempDir,
    shutdown: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let documents = tempfile::tempdir().expect("documents dir");
        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::Memory;
        config.documents.storage_root = documents.path().to_string_lossy().to_string();
        tweak(&mut config);

        let store: DynStore = Arc::new(InMemoryStore::new());
        let cache = Arc::new(LocalCacheMirror::new());
        let api = config.server.api_prefix.trim_end_matches('/').to_string();
        let state = AppState::new(config, store.clone(), cache.clone());
        let app = build_app(state);

        let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind");
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = rx.await;
                })
                .await;
        });

        let base = format!("http://{addr}");
        Self {
            api: format!("{base}{api}"),
            base,
            store,
            cache,
            documents,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api, path.trim_start_matches('/'))
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}
