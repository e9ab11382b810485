use async_trait::async_trait;
use cf_core::{ArticleStorage, Error, Result};
use std::sync::Arc;
use tracing::{error, info};

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: ArticleStorage + Sized {
    fn get_error_message() -> &'static str;
    async fn new(backend_url: Option<&str>) -> Result<Self>;
}

/// Opens the backend named `storage_type` ("memory" or "sqlite").
pub async fn create_storage(storage_type: &str, backend_url: Option<&str>) -> Result<Arc<dyn ArticleStorage>> {
    match storage_type {
        "memory" => open::<InMemoryStorage>(backend_url).await,
        #[cfg(feature = "sqlite")]
        "sqlite" => open::<SQLiteStorage>(backend_url).await,
        other => Err(Error::Config(format!("Unknown storage backend: {}", other))),
    }
}

async fn open<T: StorageBackend + 'static>(backend_url: Option<&str>) -> Result<Arc<dyn ArticleStorage>> {
    let storage = T::new(backend_url).await.map_err(|e| {
        error!("❌ {}: {}", T::get_error_message(), e);
        e
    })?;
    let count = storage.count().await?;
    info!(backend = storage.name(), articles = count, "🏦 Storage backend ready");
    Ok(Arc::new(storage) as Arc<dyn ArticleStorage>)
}
