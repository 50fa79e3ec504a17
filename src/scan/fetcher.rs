//! HTTP fetching for a single target.
//!
//! A fetch never fails the run: every transport problem is folded into the
//! returned [`FetchResult`].

use async_trait::async_trait;
use log::debug;
use rand::seq::SliceRandom;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{Client, Url};
use std::time::Duration;

use crate::config::Config;
use crate::core::constants::{defaults, probe};
use crate::core::error::Result;
use crate::core::types::{FetchError, FetchResult};

/// Body written by the first half of a write-then-read probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub body: String,
    pub content_type: &'static str,
}

impl Payload {
    /// Payload carrying `marker`, shaped after the endpoint's extension.
    pub fn for_endpoint(endpoint: &str, marker: &str) -> Self {
        if endpoint.ends_with(probe::JSON_SUFFIX) {
            Self {
                body: serde_json::json!({ "message": marker }).to_string(),
                content_type: "application/json",
            }
        } else {
            Self {
                body: marker.to_string(),
                content_type: "text/plain",
            }
        }
    }
}

/// The HTTP operations performed for one target, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPlan {
    /// GET and keep the body
    Get,
    /// HEAD and keep only the status
    Head,
    /// PUT the payload, then GET the same target and keep that body
    WriteThenRead(Payload),
}

/// Where the User-Agent header comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAgent {
    Fixed(String),
    /// One browser agent picked at random per fetch
    Rotating,
}

impl UserAgent {
    fn pick(&self) -> String {
        match self {
            UserAgent::Fixed(agent) => agent.clone(),
            UserAgent::Rotating => probe::USER_AGENTS
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(probe::USER_AGENTS[0])
                .to_string(),
        }
    }
}

impl Default for UserAgent {
    fn default() -> Self {
        UserAgent::Fixed(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string())
    }
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub verify_tls: bool,
    pub proxy: Option<String>,
    pub user_agent: UserAgent,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::core::constants::timeouts::DEFAULT_TIMEOUT_SECONDS),
            verify_tls: false,
            proxy: None,
            user_agent: UserAgent::default(),
        }
    }
}

impl FetchSettings {
    /// Settings for a run; `rotate_agents` applies when no agent is configured.
    pub fn from_config(config: &Config, rotate_agents: bool) -> Self {
        let user_agent = match config.user_agent {
            Some(ref agent) => UserAgent::Fixed(agent.clone()),
            None if rotate_agents => UserAgent::Rotating,
            None => UserAgent::default(),
        };

        Self {
            timeout: config.timeout_duration(),
            verify_tls: config.verify_tls(),
            proxy: config.proxy.clone(),
            user_agent,
        }
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, target: &str, plan: &FetchPlan) -> FetchResult;
}

/// `reqwest`-backed fetcher sharing one connection pool across all tasks.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    user_agent: UserAgent,
}

impl HttpFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self> {
        let mut client_builder = Client::builder()
            .timeout(settings.timeout)
            .redirect(Policy::limited(defaults::REDIRECT_LIMIT))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60));

        if !settings.verify_tls {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        if let Some(ref proxy_url) = settings.proxy {
            client_builder = client_builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Self {
            client: client_builder.build()?,
            user_agent: settings.user_agent.clone(),
        })
    }

    async fn get(&self, url: Url, agent: &str) -> std::result::Result<(u16, Vec<u8>), FetchError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, agent)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| match FetchError::from_reqwest(&e) {
                FetchError::Timeout => FetchError::Timeout,
                other => FetchError::Body(other.to_string()),
            })?;
        Ok((status, body.to_vec()))
    }

    async fn head(&self, url: Url, agent: &str) -> std::result::Result<u16, FetchError> {
        let response = self
            .client
            .head(url)
            .header(USER_AGENT, agent)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?;
        Ok(response.status().as_u16())
    }

    async fn put(
        &self,
        url: Url,
        agent: &str,
        payload: &Payload,
    ) -> std::result::Result<u16, FetchError> {
        let response = self
            .client
            .put(url)
            .header(USER_AGENT, agent)
            .header(CONTENT_TYPE, payload.content_type)
            .body(payload.body.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?;
        Ok(response.status().as_u16())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, target: &str, plan: &FetchPlan) -> FetchResult {
        let url = match parse_target(target) {
            Ok(url) => url,
            Err(err) => return FetchResult::failure(target, err),
        };
        let agent = self.user_agent.pick();

        let outcome = match plan {
            FetchPlan::Get => self.get(url, &agent).await,
            FetchPlan::Head => self.head(url, &agent).await.map(|status| (status, Vec::new())),
            FetchPlan::WriteThenRead(payload) => {
                match self.put(url.clone(), &agent, payload).await {
                    Ok(put_status) => {
                        debug!("PUT {target} -> {put_status}");
                        self.get(url, &agent).await
                    }
                    Err(err) => Err(err),
                }
            }
        };

        match outcome {
            Ok((status, body)) => FetchResult::success(target, status, body),
            Err(err) => FetchResult::failure(target, err),
        }
    }
}

/// Parse a target, requiring an absolute http(s) URL.
pub fn parse_target(target: &str) -> std::result::Result<Url, FetchError> {
    let url = Url::parse(target).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(FetchError::InvalidUrl(format!(
            "unsupported scheme '{scheme}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use mockito::{Matcher, Server};

    fn fetcher_with_timeout(secs: u64) -> HttpFetcher {
        let settings = FetchSettings {
            timeout: Duration::from_secs(secs),
            ..Default::default()
        };
        HttpFetcher::new(&settings).expect("client should build")
    }

    #[test]
    fn test_payload__text_endpoint() {
        let payload = Payload::for_endpoint("/upload/bugbountytesting.txt", "marker");
        assert_eq!(payload.body, "marker");
        assert_eq!(payload.content_type, "text/plain");
    }

    #[test]
    fn test_payload__json_endpoint() {
        let payload = Payload::for_endpoint("/bugbountytesting.json", "marker");
        assert_eq!(payload.body, r#"{"message":"marker"}"#);
        assert_eq!(payload.content_type, "application/json");
    }

    #[test]
    fn test_parse_target__rejects_relative_and_unsupported() {
        assert!(matches!(
            parse_target("example.com/a"),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_target("ftp://example.com/a"),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(parse_target("https://example.com/a").is_ok());
    }

    #[test]
    fn test_user_agent__rotating_picks_from_pool() {
        for _ in 0..20 {
            let agent = UserAgent::Rotating.pick();
            assert!(probe::USER_AGENTS.contains(&agent.as_str()));
        }
        assert_eq!(UserAgent::Fixed("x".to_string()).pick(), "x");
    }

    #[test]
    fn test_fetch_settings__from_config() {
        let config = Config::default();
        assert_eq!(
            FetchSettings::from_config(&config, true).user_agent,
            UserAgent::Rotating
        );
        assert_eq!(
            FetchSettings::from_config(&config, false).user_agent,
            UserAgent::default()
        );

        let pinned = Config {
            user_agent: Some("pinned/1.0".to_string()),
            ..Default::default()
        };
        assert_eq!(
            FetchSettings::from_config(&pinned, true).user_agent,
            UserAgent::Fixed("pinned/1.0".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch__get_returns_body_and_status() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/page")
            .with_status(200)
            .with_body("<a href=\"https://github.com/foo\">")
            .create_async()
            .await;
        let target = server.url() + "/page";

        let result = fetcher_with_timeout(5).fetch(&target, &FetchPlan::Get).await;

        assert!(result.is_success());
        assert_eq!(result.status, Some(200));
        assert!(result.body_text().contains("github.com/foo"));
    }

    #[tokio::test]
    async fn test_fetch__non_2xx_is_not_a_failure() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("gone")
            .create_async()
            .await;
        let target = server.url() + "/missing";

        let result = fetcher_with_timeout(5).fetch(&target, &FetchPlan::Get).await;

        assert!(result.is_success());
        assert_eq!(result.status, Some(404));
    }

    #[tokio::test]
    async fn test_fetch__head_has_no_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("HEAD", "/alive")
            .with_status(200)
            .create_async()
            .await;
        let target = server.url() + "/alive";

        let result = fetcher_with_timeout(5).fetch(&target, &FetchPlan::Head).await;

        assert_eq!(result.status, Some(200));
        assert!(result.body.is_empty());
    }

    #[tokio::test]
    async fn test_fetch__write_then_read_sends_put_before_get() {
        let mut server = Server::new_async().await;
        let put = server
            .mock("PUT", "/upload.txt")
            .match_header("content-type", "text/plain")
            .match_body(Matcher::Exact("canary".to_string()))
            .with_status(201)
            .expect(1)
            .create_async()
            .await;
        let get = server
            .mock("GET", "/upload.txt")
            .with_status(200)
            .with_body("canary")
            .expect(1)
            .create_async()
            .await;
        let target = server.url() + "/upload.txt";
        let plan = FetchPlan::WriteThenRead(Payload::for_endpoint("/upload.txt", "canary"));

        let result = fetcher_with_timeout(5).fetch(&target, &plan).await;

        put.assert_async().await;
        get.assert_async().await;
        assert_eq!(result.status, Some(200));
        assert_eq!(result.body_text(), "canary");
    }

    #[tokio::test]
    async fn test_fetch__invalid_url_is_reported_without_network() {
        let result = fetcher_with_timeout(1)
            .fetch("not a url", &FetchPlan::Get)
            .await;

        assert!(result.is_failure());
        assert!(matches!(result.error, Some(FetchError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch__connection_refused_is_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = fetcher_with_timeout(2)
            .fetch(&format!("http://{addr}/"), &FetchPlan::Get)
            .await;

        assert!(result.is_failure());
        assert_eq!(result.status, None);
    }

    #[tokio::test]
    async fn test_fetch__timeout_is_reported_as_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold connections without ever answering.
        let _silent = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let result = fetcher_with_timeout(1)
            .fetch(&format!("http://{addr}/slow"), &FetchPlan::Get)
            .await;

        assert_eq!(result.error, Some(FetchError::Timeout));
    }
}
