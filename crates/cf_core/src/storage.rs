use async_trait::async_trait;
use crate::types::Article;
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Short tag identifying the backend, reported to readers as the `source`
    fn name(&self) -> &str;

    /// Insert the article unless one with the same url is already stored.
    ///
    /// Returns `true` when a new record was created. An existing record is
    /// never modified.
    async fn insert_if_absent(&self, article: &Article) -> Result<bool>;

    /// All articles carrying a usable image, most recently fetched first
    async fn list_with_images(&self) -> Result<Vec<Article>>;

    /// Look up a single article by its url
    async fn get_by_url(&self, url: &str) -> Result<Option<Article>>;

    /// Number of stored articles
    async fn count(&self) -> Result<usize>;
}
