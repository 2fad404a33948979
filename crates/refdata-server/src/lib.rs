pub mod attachments;
pub mod cache;
pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod server;
pub mod service;

pub use attachments::{DocumentService, DocumentStorage};
pub use cache::{CacheMirror, DynCache, LocalCacheMirror, RedisCacheMirror, create_cache_mirror};
pub use config::{
    AppConfig, DocumentsConfig, ListConfig, PostgresStorageConfig, RedisConfig, ServerConfig,
    StorageBackend, StorageConfig,
};
pub use observability::init_tracing;
pub use server::{AppState, RefdataServer, ServerBuilder, build_app};
pub use service::{ResourceBinding, ResourceService, ServiceError};
