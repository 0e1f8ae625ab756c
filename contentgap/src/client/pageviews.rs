//! Wikimedia page-view REST API adapter.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use reqwest::Url;
use serde::Deserialize;

use super::config::ClientConfig;
use super::window::ViewWindow;
use super::PopularityProvider;
use crate::errors::{GapError, GapResult};
use crate::utils::trailing_day_range;

#[derive(Debug, Deserialize)]
struct DailyViews {
    #[serde(default)]
    views: u64,
}

#[derive(Debug, Deserialize)]
struct PerArticle {
    #[serde(default)]
    items: Option<Vec<DailyViews>>,
}

/// Sums the daily series of a per-article response.
fn sum_views(value: serde_json::Value) -> GapResult<u64> {
    let response: PerArticle = serde_json::from_value(value)?;
    let items = response
        .items
        .ok_or_else(|| GapError::missing_data("items"))?;
    Ok(items.iter().map(|d| d.views).sum())
}

/// Client for `/metrics/pageviews/per-article`.
#[derive(Debug, Clone)]
pub struct PageviewsClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl PageviewsClient {
    /// Creates a client from configuration.
    pub fn new(config: ClientConfig) -> GapResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| GapError::invalid_configuration(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// URL of the daily series of `title` over `window`, ending on `end`.
    ///
    /// The title is pushed as a single path segment, so `/` and non-ASCII
    /// characters are percent-encoded.
    pub fn series_url(&self, title: &str, window: ViewWindow, end: NaiveDate) -> GapResult<Url> {
        let (start, end) = trailing_day_range(end, window.days());
        let project = self.config.project();
        let mut url = Url::parse(&self.config.rest_url)
            .map_err(|e| GapError::invalid_configuration(format!("rest_url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| GapError::invalid_configuration("rest_url cannot be a base"))?
            .pop_if_empty()
            .extend(["metrics", "pageviews", "per-article", project.as_str()])
            .extend(["all-access", "all-agents"])
            .push(&title.replace(' ', "_"))
            .extend(["daily", start.as_str(), end.as_str()]);
        Ok(url)
    }
}

#[async_trait]
impl PopularityProvider for PageviewsClient {
    async fn views_over_window(&self, title: &str, window_days: u32) -> GapResult<u64> {
        let window = ViewWindow::try_from(window_days)?;
        // Today's counts are not published yet.
        let end = Utc::now().date_naive() - Duration::days(1);
        let url = self.series_url(title, window, end)?;
        tracing::debug!(%url, "Page-view request");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| GapError::upstream("views_over_window", e))?;
        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GapError::upstream("views_over_window", e))?;
        sum_views(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sum_views() {
        let value = json!({"items": [
            {"article": "Paris", "timestamp": "2024010100", "views": 120},
            {"article": "Paris", "timestamp": "2024010200", "views": 80}
        ]});
        assert_eq!(sum_views(value).unwrap(), 200);
    }

    #[test]
    fn test_missing_items_is_missing_data() {
        let err = sum_views(json!({"detail": "not found"})).unwrap_err();
        assert!(matches!(err, GapError::MissingData { ref field } if field == "items"));
    }

    #[test]
    fn test_series_url() {
        let client = PageviewsClient::new(ClientConfig::new("fr")).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 30).unwrap();
        assert_eq!(
            client.series_url("Tour Eiffel", ViewWindow::Days30, end).unwrap().as_str(),
            "https://wikimedia.org/api/rest_v1/metrics/pageviews/per-article/fr.wikipedia/all-access/all-agents/Tour_Eiffel/daily/20240301/20240330"
        );
    }

    #[test]
    fn test_series_url_encodes_title_segment() {
        let client = PageviewsClient::new(ClientConfig::new("fr")).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 30).unwrap();
        let url = |title: &str| {
            client
                .series_url(title, ViewWindow::Days30, end)
                .unwrap()
                .as_str()
                .to_string()
        };
        assert!(url("Île de France").contains("/all-agents/%C3%8Ele_de_France/daily/"));
        assert!(url("AC/DC").contains("/all-agents/AC%2FDC/daily/"));
        assert!(url("100%").contains("/all-agents/100%25/daily/"));
    }

    #[test]
    fn test_series_url_tolerates_trailing_slash() {
        let config = ClientConfig {
            rest_url: "https://wikimedia.org/api/rest_v1/".to_string(),
            ..ClientConfig::new("fr")
        };
        let client = PageviewsClient::new(config).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 30).unwrap();
        let url = client.series_url("Paris", ViewWindow::Days60, end).unwrap();
        assert_eq!(
            url.path(),
            "/api/rest_v1/metrics/pageviews/per-article/fr.wikipedia/all-access/all-agents/Paris/daily/20240131/20240330"
        );
    }

    #[tokio::test]
    async fn test_unsupported_window_fails_before_any_request() {
        let client = PageviewsClient::new(ClientConfig::new("fr")).unwrap();
        let err = client.views_over_window("Paris", 45).await.unwrap_err();
        assert!(matches!(err, GapError::InvalidConfiguration(_)));
    }
}
