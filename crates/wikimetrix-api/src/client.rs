//! HTTP client for the Wikimedia APIs with connection pooling and rate limiting
//!
//! Every request is a single GET awaited before the next one is issued.
//! Failed requests are reported to the caller as they are; nothing is retried.

use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tracing::{debug, instrument, warn};
use url::Url;
use wikimetrix_common::{MetrixError, Project, Result};

/// Configuration for the Wikimedia API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent; Wikimedia rejects requests without a descriptive one
    pub user_agent: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Connection pool max idle connections per host (default: 4)
    pub max_idle_per_host: usize,
    /// Rate limit: requests per second (default: 10)
    pub rate_limit_per_sec: u32,
    /// Continuation pages followed per listing (default: 50)
    pub action_api_max_pages: u32,
    /// Base of the Wikibase REST API
    pub wikidata_rest_base: String,
    /// Base of the page-view metrics REST API
    pub pageviews_rest_base: String,
    /// Fixed Action API endpoint used for every project instead of
    /// `https://{domain}/w/api.php`
    pub action_api_endpoint: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!(
                "wiki-metrix/",
                env!("CARGO_PKG_VERSION"),
                " (https://github.com/temporal-communities/wiki-metrix)"
            )
            .to_string(),
            timeout_secs: 30,
            max_idle_per_host: 4,
            rate_limit_per_sec: 10,
            action_api_max_pages: 50,
            wikidata_rest_base: "https://www.wikidata.org/w/rest.php/wikibase/v1".to_string(),
            pageviews_rest_base: "https://wikimedia.org/api/rest_v1/metrics/pageviews".to_string(),
            action_api_endpoint: None,
        }
    }
}

impl ClientConfig {
    /// Create a configuration with the given user agent
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the connection pool size
    pub fn with_pool_size(mut self, max_idle_per_host: usize) -> Self {
        self.max_idle_per_host = max_idle_per_host;
        self
    }

    /// Set the rate limit
    pub fn with_rate_limit(mut self, rate_limit_per_sec: u32) -> Self {
        self.rate_limit_per_sec = rate_limit_per_sec;
        self
    }

    /// Set how many continuation pages a listing may span
    pub fn with_max_pages(mut self, action_api_max_pages: u32) -> Self {
        self.action_api_max_pages = action_api_max_pages;
        self
    }

    /// Set the page-view REST base
    pub fn with_pageviews_base(mut self, base: impl Into<String>) -> Self {
        self.pageviews_rest_base = base.into();
        self
    }

    /// Set the Wikibase REST base
    pub fn with_wikidata_base(mut self, base: impl Into<String>) -> Self {
        self.wikidata_rest_base = base.into();
        self
    }

    /// Send all Action API requests to one endpoint
    pub fn with_action_api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.action_api_endpoint = Some(endpoint.into());
        self
    }
}

/// Status and body of a completed request
#[derive(Debug, Clone)]
pub(crate) struct HttpReply {
    pub status: StatusCode,
    pub body: String,
}

/// Wikimedia API client with connection pooling and rate limiting
#[derive(Debug, Clone)]
pub struct WikiClient {
    client: Client,
    config: ClientConfig,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl WikiClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.user_agent.trim().is_empty() {
            return Err(MetrixError::config("User agent cannot be empty"));
        }
        for base in [&config.pageviews_rest_base, &config.wikidata_rest_base]
            .into_iter()
            .chain(config.action_api_endpoint.as_ref())
        {
            Url::parse(base)
                .map_err(|e| MetrixError::config_with_source(format!("Invalid API URL '{base}'"), e))?;
        }

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| MetrixError::network_with_source("Failed to create HTTP client", e))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_per_sec)
                .ok_or_else(|| MetrixError::config("Rate limit must be greater than 0"))?,
        );
        let rate_limiter = Arc::new(DefaultDirectRateLimiter::direct(quota));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Create a new client with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// The configuration the client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Action API endpoint for a project
    pub fn action_api_url(&self, project: &Project) -> String {
        self.config
            .action_api_endpoint
            .clone()
            .unwrap_or_else(|| project.action_api_url())
    }

    /// Send one GET request and read the whole body
    #[instrument(skip(self, query), fields(url = %url))]
    pub(crate) async fn send<Q>(&self, url: &str, query: &Q) -> Result<HttpReply>
    where
        Q: Serialize + ?Sized,
    {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;
        let status = response.status();
        debug!(status = status.as_u16(), "Response received");

        let body = response
            .text()
            .await
            .map_err(|e| MetrixError::network_with_source("Failed to read response body", e))?;

        Ok(HttpReply { status, body })
    }

    /// GET a JSON document; 404 becomes `NotFound`, other non-2xx statuses `Api`
    pub async fn get_json<T, Q>(&self, url: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let reply = self.send(url, query).await?;
        if !reply.status.is_success() {
            return Err(status_error(url, &reply));
        }
        Ok(serde_json::from_str(&reply.body)?)
    }

    /// One Action API request with the standard parameters added.
    ///
    /// An `error` object in the body is turned into an `Api` error carrying
    /// the MediaWiki error code.
    #[instrument(skip(self, params), fields(project = %project))]
    pub async fn action_query(&self, project: &Project, params: &[(String, String)]) -> Result<Value> {
        let mut query: Vec<(String, String)> = vec![
            ("action".to_string(), "query".to_string()),
            ("format".to_string(), "json".to_string()),
            ("formatversion".to_string(), "2".to_string()),
            ("utf8".to_string(), "1".to_string()),
        ];
        query.extend(params.iter().cloned());

        let url = self.action_api_url(project);
        let body: Value = self.get_json(&url, &query).await?;
        check_action_error(&body)?;
        if let Some(warnings) = body.get("warnings") {
            warn!(%warnings, "Action API returned warnings");
        }
        Ok(body)
    }

    /// Follow `continue` until the listing is exhausted or the page cap is hit.
    ///
    /// `collect` sees every response body in order. Returns `true` when the
    /// cap cut the listing short.
    pub async fn query_continued<F>(&self, project: &Project, params: &[(&str, &str)], mut collect: F) -> Result<bool>
    where
        F: FnMut(&Value) -> Result<()> + Send,
    {
        let base: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut current = base.clone();

        for page in 1..=self.config.action_api_max_pages {
            let body = self.action_query(project, &current).await?;
            collect(&body)?;

            match body.get("continue").and_then(Value::as_object) {
                Some(cont) => {
                    debug!(page, "Following continuation");
                    current = merge_continue(&base, cont);
                }
                None => return Ok(false),
            }
        }

        warn!(
            max_pages = self.config.action_api_max_pages,
            "Listing truncated after reaching the continuation page cap"
        );
        Ok(true)
    }

    /// Whether the rate limiter would let a request through right now
    pub fn has_rate_limit_capacity(&self) -> bool {
        self.rate_limiter.check().is_ok()
    }
}

/// Base parameters plus the continuation values of the previous response
pub(crate) fn merge_continue(base: &[(String, String)], cont: &serde_json::Map<String, Value>) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = base
        .iter()
        .filter(|(key, _)| !cont.contains_key(key))
        .cloned()
        .collect();
    for (key, value) in cont {
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        params.push((key.clone(), value));
    }
    params
}

/// Turn an Action API `error` object into an error
pub(crate) fn check_action_error(body: &Value) -> Result<()> {
    match body.get("error") {
        Some(error) => {
            let code = error.get("code").and_then(Value::as_str).unwrap_or("unknown");
            let info = error
                .get("info")
                .and_then(Value::as_str)
                .unwrap_or("no details given");
            Err(MetrixError::api_with_code(format!("{code}: {info}"), code))
        }
        None => Ok(()),
    }
}

/// Error for a non-2xx reply, using whatever detail the body offers
pub(crate) fn status_error(url: &str, reply: &HttpReply) -> MetrixError {
    let detail = serde_json::from_str::<Value>(&reply.body)
        .ok()
        .and_then(|body| {
            ["detail", "message", "title"]
                .iter()
                .find_map(|key| body.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| reply.status.canonical_reason().unwrap_or("error").to_string());

    if reply.status == StatusCode::NOT_FOUND {
        MetrixError::not_found(format!("{url} ({detail})"))
    } else {
        MetrixError::api_with_status(
            format!("HTTP {} from {url}: {detail}", reply.status.as_u16()),
            reply.status.as_u16(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new("metrix-test/1.0")
            .with_timeout(60)
            .with_pool_size(8)
            .with_rate_limit(5)
            .with_max_pages(2);

        assert_eq!(config.user_agent, "metrix-test/1.0");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.max_idle_per_host, 8);
        assert_eq!(config.rate_limit_per_sec, 5);
        assert_eq!(config.action_api_max_pages, 2);
        assert!(ClientConfig::default().user_agent.contains("temporal-communities/wiki-metrix"));
    }

    #[tokio::test]
    async fn test_client_creation() {
        assert!(WikiClient::with_defaults().is_ok());
        let client = WikiClient::new(ClientConfig::default().with_rate_limit(1)).unwrap();
        assert!(client.has_rate_limit_capacity());
    }

    #[test]
    fn test_rate_limit_validation() {
        let result = WikiClient::new(ClientConfig::default().with_rate_limit(0));
        let error = result.unwrap_err();
        assert!(error.to_string().contains("Rate limit must be greater than 0"));
    }

    #[test]
    fn test_invalid_base_rejected() {
        let result = WikiClient::new(ClientConfig::default().with_pageviews_base("not a url"));
        assert!(matches!(result.unwrap_err(), MetrixError::Config { .. }));
        assert!(WikiClient::new(ClientConfig::new("  ")).is_err());
    }

    #[test]
    fn test_action_api_url() {
        let client = WikiClient::with_defaults().unwrap();
        let project = Project::new("fr", "wikisource");
        assert_eq!(client.action_api_url(&project), "https://fr.wikisource.org/w/api.php");

        let mirrored = WikiClient::new(ClientConfig::default().with_action_api_endpoint("http://127.0.0.1:8080/api.php")).unwrap();
        assert_eq!(mirrored.action_api_url(&project), "http://127.0.0.1:8080/api.php");
    }

    #[tokio::test]
    async fn test_rate_limiter_integration() {
        let client = WikiClient::new(ClientConfig::default().with_rate_limit(10)).unwrap();
        client.rate_limiter.until_ready().await;
        client.rate_limiter.until_ready().await;
    }

    #[test]
    fn test_merge_continue_replaces_previous_values() {
        let base = vec![
            ("prop".to_string(), "revisions".to_string()),
            ("rvlimit".to_string(), "max".to_string()),
        ];
        let first = json!({ "rvcontinue": "20040101|123", "continue": "||" });
        let params = merge_continue(&base, first.as_object().unwrap());
        assert!(params.contains(&("rvcontinue".to_string(), "20040101|123".to_string())));
        assert!(params.contains(&("continue".to_string(), "||".to_string())));
        assert!(params.contains(&("prop".to_string(), "revisions".to_string())));

        let numeric = json!({ "lhcontinue": 4711, "continue": "||" });
        let params = merge_continue(&base, numeric.as_object().unwrap());
        assert!(params.contains(&("lhcontinue".to_string(), "4711".to_string())));
        assert!(!params.iter().any(|(k, _)| k == "rvcontinue"));
    }

    #[test]
    fn test_action_error_detection() {
        assert!(check_action_error(&json!({ "batchcomplete": true })).is_ok());

        let error = check_action_error(&json!({
            "error": { "code": "badvalue", "info": "Unrecognized value for parameter \"prop\"" }
        }))
        .unwrap_err();
        match error {
            MetrixError::Api { code, .. } => assert_eq!(code.as_deref(), Some("badvalue")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_error_mapping() {
        let not_found = HttpReply {
            status: StatusCode::NOT_FOUND,
            body: json!({ "type": "https://mediawiki.org/wiki/HyperSwitch/errors/not_found", "detail": "The date(s) you used are valid, but we either do not have data for those date(s), or the project you asked for is not loaded yet." }).to_string(),
        };
        let error = status_error("https://example.org/x", &not_found);
        assert!(error.is_not_found());
        assert!(error.to_string().contains("do not have data"));

        let server = HttpReply {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "<html>down</html>".to_string(),
        };
        match status_error("https://example.org/y", &server) {
            MetrixError::Api { status_code, message, .. } => {
                assert_eq!(status_code, Some(503));
                assert!(message.contains("Service Unavailable"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
