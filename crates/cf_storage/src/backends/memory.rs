use async_trait::async_trait;
use cf_core::{Article, ArticleStorage, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::StorageBackend;

/// Articles in insertion order plus a url index into them.
#[derive(Default)]
struct MemoryStore {
    articles: Vec<Article>,
    by_url: HashMap<String, usize>,
}

impl MemoryStore {
    fn insert_if_absent(&mut self, article: &Article) -> bool {
        if self.by_url.contains_key(&article.url) {
            return false;
        }
        self.by_url.insert(article.url.clone(), self.articles.len());
        self.articles.push(article.clone());
        true
    }

    fn list_with_images(&self) -> Vec<Article> {
        // Later insertions first, so equal timestamps keep newest-inserted on top.
        let mut articles = self.articles.iter()
            .rev()
            .filter(|article| article.has_image())
            .cloned()
            .collect::<Vec<_>>();
        articles.sort_by(|a, b| b.fetched_at.cmp(&a.fetched_at));
        articles
    }

    fn get_by_url(&self, url: &str) -> Option<Article> {
        self.by_url.get(url).map(|&i| self.articles[i].clone())
    }

    fn len(&self) -> usize {
        self.articles.len()
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn new(_backend_url: Option<&str>) -> Result<Self> {
        Ok(Self::default())
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn insert_if_absent(&self, article: &Article) -> Result<bool> {
        let mut store = self.store.write().await;
        Ok(store.insert_if_absent(article))
    }

    async fn list_with_images(&self) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(store.list_with_images())
    }

    async fn get_by_url(&self, url: &str) -> Result<Option<Article>> {
        let store = self.store.read().await;
        Ok(store.get_by_url(url))
    }

    async fn count(&self) -> Result<usize> {
        let store = self.store.read().await;
        Ok(store.len())
    }
}
