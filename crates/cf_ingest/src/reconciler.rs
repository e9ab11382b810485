use cf_core::{Article, ArticleStorage, RawArticle};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, warn};

/// Outcome of reconciling one fetched batch against the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub fetched_at: DateTime<Utc>,
    /// Articles in the batch
    pub fetched: usize,
    /// Records actually created
    pub inserted: usize,
    /// Articles without a usable url
    pub skipped: usize,
    /// Articles the store refused
    pub failed: usize,
}

impl CycleReport {
    fn new(fetched_at: DateTime<Utc>, fetched: usize) -> Self {
        Self {
            fetched_at,
            fetched,
            inserted: 0,
            skipped: 0,
            failed: 0,
        }
    }

    /// Articles that were already stored, earlier in this batch or in a previous cycle
    pub fn already_known(&self) -> usize {
        self.fetched - self.inserted - self.skipped - self.failed
    }
}

/// Inserts every article of `batch` whose url is not stored yet, in batch order.
///
/// Stored records are never touched. A store failure on one article is logged
/// and the remaining articles are still processed.
pub async fn reconcile(
    storage: &dyn ArticleStorage,
    batch: &[RawArticle],
    fetched_at: DateTime<Utc>,
) -> CycleReport {
    let mut report = CycleReport::new(fetched_at, batch.len());

    for raw in batch {
        let Some(article) = Article::from_raw(raw, fetched_at) else {
            warn!(title = ?raw.title, "⏭️ Skipping article without url");
            report.skipped += 1;
            continue;
        };

        match storage.insert_if_absent(&article).await {
            Ok(true) => {
                debug!(url = %article.url, "🆕 Inserted article");
                report.inserted += 1;
            }
            Ok(false) => {
                debug!(url = %article.url, "Article already stored");
            }
            Err(e) => {
                error!(url = %article.url, error = %e, "❌ Failed to store article");
                report.failed += 1;
            }
        }
    }

    report
}
