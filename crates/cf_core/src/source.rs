use async_trait::async_trait;
use crate::types::RawArticle;
use crate::Result;

pub const DEFAULT_KEYWORDS: &str = "cybersecurity";
pub const DEFAULT_COUNTRY: &str = "US";

/// Search filter sent upstream on every cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keywords: String,
    pub country: String,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Returns the name of the upstream service
    fn name(&self) -> &str;

    /// Fetches one batch of raw articles. A single attempt, no paging.
    async fn fetch(&self) -> Result<Vec<RawArticle>>;
}
