use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{Router, middleware, routing::get};
use refdata_db_memory::InMemoryStore;
use refdata_storage::DynStore;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{
    attachments::DocumentStorage,
    cache::{DynCache, create_cache_mirror},
    config::{AppConfig, StorageBackend},
    handlers,
    middleware::{self as app_middleware, RequestId},
    routes,
};

/// Everything a request handler may need.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: DynStore,
    pub cache: DynCache,
    pub documents: DocumentStorage,
}

impl AppState {
    pub fn new(config: AppConfig, store: DynStore, cache: DynCache) -> Self {
        let documents = DocumentStorage::new(&config.documents.storage_root);
        Self {
            config: Arc::new(config),
            store,
            cache,
            documents,
        }
    }

    /// Opens the configured store and cache mirror.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store: DynStore = match config.storage.backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Arc::new(InMemoryStore::new())
            }
            StorageBackend::Postgres => {
                let pg = config.storage.postgres.store_config();
                tracing::info!(
                    url = %refdata_db_postgres::mask_password(&pg.url),
                    pool_size = pg.pool_size,
                    "Connecting to PostgreSQL"
                );
                refdata_db_postgres::create_store(pg)
                    .await
                    .context("failed to open PostgreSQL store")?
            }
        };

        let cache = create_cache_mirror(&config.redis).await;
        Ok(Self::new(config.clone(), store, cache))
    }
}

pub struct RefdataServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    let system = Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/metrics", get(handlers::metrics))
        .with_state(state.clone());

    Router::new()
        .merge(system)
        .merge(routes::api_router(&state))
        // Needs the matched route template, so it runs after routing
        .route_layer(middleware::from_fn(app_middleware::track_metrics))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .extensions()
                        .get::<RequestId>()
                        .map(|id| id.as_str().to_string())
                        .unwrap_or_default();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        // Outside the trace layer so the span can read the id
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub async fn build(self) -> anyhow::Result<RefdataServer> {
        crate::metrics::init_metrics();
        let state = AppState::from_config(&self.config).await?;
        tracing::info!(
            storage = state.store.backend_name(),
            cache = state.cache.mode(),
            documents = %state.documents.root().display(),
            "Application state ready"
        );

        Ok(RefdataServer {
            addr: self.addr,
            app: build_app(state),
        })
    }
}

impl RefdataServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
