//! Client for the Currents news search API.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use cf_core::{Error, NewsSource, RawArticle, Result, SearchQuery};
use serde::Deserialize;
use tracing::debug;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://api.currentsapi.services/v1";
const SEARCH_ENDPOINT: &str = "search";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<RawArticle>,
}

pub struct CurrentsClient {
    api_key: String,
    endpoint: String,
    query: SearchQuery,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl fmt::Debug for CurrentsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrentsClient")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("query", &self.query)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CurrentsClient {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Config("Currents API key is required".to_string()));
        }
        Ok(Self {
            api_key,
            endpoint: endpoint.into(),
            query: SearchQuery::default(),
            timeout: None,
            client: reqwest::Client::new(),
        })
    }

    #[must_use = "dropped changed client"]
    pub fn with_query(mut self, query: SearchQuery) -> Self {
        self.query = query;
        self
    }

    /// Bounds each search request. Without one a hung upstream stalls the cycle.
    #[must_use = "dropped changed client"]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn build_search_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| Error::Config(format!("Invalid Currents endpoint {}: {}", self.endpoint, e)))?;

        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Currents endpoint cannot be a base: {}", self.endpoint)))?
            .pop_if_empty()
            .push(SEARCH_ENDPOINT);

        url.query_pairs_mut()
            .append_pair("keywords", &self.query.keywords)
            .append_pair("country", &self.query.country);

        Ok(url)
    }

    pub async fn search(&self) -> Result<Vec<RawArticle>> {
        let url = self.build_search_url()?;
        debug!(%url, "Querying Currents");

        let mut request = self.client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!("Currents responded with {}", status)));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.news)
    }
}

#[async_trait]
impl NewsSource for CurrentsClient {
    fn name(&self) -> &str {
        "currents"
    }

    async fn fetch(&self) -> Result<Vec<RawArticle>> {
        self.search().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{header, method, path, query_param},
        Mock,
        MockServer,
        ResponseTemplate,
    };

    #[test]
    fn test_client_requires_api_key() {
        let result = CurrentsClient::new("  ", DEFAULT_ENDPOINT);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = CurrentsClient::new("secret-key", DEFAULT_ENDPOINT).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_search_url() {
        let client = CurrentsClient::new("key", DEFAULT_ENDPOINT).unwrap();
        let url = client.build_search_url().unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.currentsapi.services/v1/search?keywords=cybersecurity&country=US"
        );

        let client = CurrentsClient::new("key", "https://example.com/v1/").unwrap();
        assert_eq!(client.build_search_url().unwrap().path(), "/v1/search");
    }

    #[tokio::test]
    async fn test_search_sends_filter_and_key() {
        let mock_server = MockServer::start().await;
        let client = CurrentsClient::new("test-key", mock_server.uri()).unwrap();

        let body = json!({
            "status": "ok",
            "news": [
                {
                    "title": "Ransomware hits hospital",
                    "description": "Systems offline",
                    "url": "https://news.example.com/ransomware",
                    "image": "https://img.example.com/r.png",
                    "published": "2024-05-01 10:00:00 +0000"
                },
                {
                    "title": "Patch Tuesday",
                    "url": "https://news.example.com/patch",
                    "image": "None"
                }
            ]
        });

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("keywords", "cybersecurity"))
            .and(query_param("country", "US"))
            .and(header("Authorization", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let articles = client.fetch().await.unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].url.as_deref(), Some("https://news.example.com/ransomware"));
        assert_eq!(articles[1].image.as_deref(), Some("None"));
        assert_eq!(articles[1].description, None);
    }

    #[tokio::test]
    async fn test_missing_news_field_is_empty_batch() {
        let mock_server = MockServer::start().await;
        let client = CurrentsClient::new("test-key", mock_server.uri()).unwrap();

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
            .mount(&mock_server)
            .await;

        assert!(client.fetch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mock_server = MockServer::start().await;
        let client = CurrentsClient::new("bad-key", mock_server.uri()).unwrap();

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let result = client.fetch().await;
        assert!(matches!(result, Err(Error::Upstream(_))));
    }

    #[tokio::test]
    async fn test_custom_query() {
        let mock_server = MockServer::start().await;
        let client = CurrentsClient::new("test-key", mock_server.uri())
            .unwrap()
            .with_query(SearchQuery {
                keywords: "malware".to_string(),
                country: "GB".to_string(),
            })
            .with_timeout(Duration::from_secs(5));

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("keywords", "malware"))
            .and(query_param("country", "GB"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "news": [] })))
            .expect(1)
            .mount(&mock_server)
            .await;

        assert!(client.fetch().await.unwrap().is_empty());
    }
}
