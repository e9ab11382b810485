use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Literal the upstream API puts in place of a missing image
pub const NO_VALUE_PLACEHOLDER: &str = "None";

/// A stored article. Created once per url and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: Option<String>,
    pub published: String,
    pub fetched_at: DateTime<Utc>,
}

impl Article {
    /// Builds the record to insert for a fetched article.
    ///
    /// Returns `None` when the article has no usable url, since the url is
    /// the only key an article can be deduplicated on.
    pub fn from_raw(raw: &RawArticle, fetched_at: DateTime<Utc>) -> Option<Self> {
        let url = raw.url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;

        Some(Self {
            title: raw.title.clone().unwrap_or_default(),
            description: raw.description.clone().unwrap_or_default(),
            url: url.to_string(),
            image_url: raw.image.clone(),
            published: raw.published.clone().unwrap_or_default(),
            fetched_at,
        })
    }

    pub fn has_image(&self) -> bool {
        has_image(self.image_url.as_deref())
    }
}

/// An article as returned by the news search API. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub published: Option<String>,
}

/// Whether an image url is worth showing: not null, not blank and not the
/// upstream "None" placeholder.
pub fn has_image(image_url: Option<&str>) -> bool {
    match image_url.map(str::trim) {
        Some(url) => !url.is_empty() && url != NO_VALUE_PLACEHOLDER,
        None => false,
    }
}
