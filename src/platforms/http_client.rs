//! 共享HTTP客户端
//!
//! 负责各平台策略的所有网络请求
//!
//! # 分层
//!
//! - [`HttpTransport`] - 单次请求，不做重试（真实实现为 [`ReqwestTransport`]）
//! - [`HttpFetcher`] - 在传输层之上实现有界重试、重定向解析、JSON解码和UA轮换
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use video_link_resolver::platforms::http_client::{HttpFetcher, HttpRequest};
//!
//! let fetcher = HttpFetcher::from_config(&config)?;
//! let html = fetcher.fetch_text(HttpRequest::get("https://v.douyin.com/xxx/")).await?;
//! ```

use crate::core::{ResolveError, ResolverConfig, RetryPolicy};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// UA 列表为空时使用
const FALLBACK_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 单次GET请求描述
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub follow_redirects: bool,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            follow_redirects: true,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn no_redirect(mut self) -> Self {
        self.follow_redirects = false;
        self
    }
}

/// 响应快照（响应头名称统一小写）
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub final_url: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.status, 301 | 302 | 303 | 307 | 308)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|s| s.as_str())
    }
}

/// 传输层：执行一次请求
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ResolveError>;
}

/// 基于 reqwest 的传输层
///
/// 持有两个客户端：一个自动跟随重定向，一个不跟随（用于读取 Location）
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    no_redirect_client: reqwest::Client,
}

impl ReqwestTransport {
    /// 创建传输层，`timeout` 为单次请求超时
    pub fn new(timeout: Duration) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;
        let no_redirect_client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            no_redirect_client,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ResolveError> {
        let client = if request.follow_redirects {
            &self.client
        } else {
            &self.no_redirect_client
        };

        let mut builder = client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_lowercase(), v.to_string())))
            .collect();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            final_url,
            headers,
            body,
        })
    }
}

/// 带重试的请求器
///
/// 可廉价克隆，每个策略持有一份
#[derive(Clone)]
pub struct HttpFetcher {
    transport: Arc<dyn HttpTransport>,
    retry: RetryPolicy,
    user_agents: Arc<Vec<String>>,
}

impl HttpFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, retry: RetryPolicy) -> Self {
        Self {
            transport,
            retry,
            user_agents: Arc::new(Vec::new()),
        }
    }

    /// 按配置创建真实网络请求器
    pub fn from_config(config: &ResolverConfig) -> Result<Self, ResolveError> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Ok(Self::new(Arc::new(transport), config.retry_policy())
            .with_user_agents(config.user_agents.clone()))
    }

    pub fn with_user_agents(mut self, user_agents: Vec<String>) -> Self {
        self.user_agents = Arc::new(user_agents);
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// 随机选择一个 User-Agent
    pub fn random_user_agent(&self) -> String {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| FALLBACK_USER_AGENT.to_string())
    }

    /// 获取页面文本（非200或异常时重试）
    pub async fn fetch_text(&self, request: HttpRequest) -> Result<String, ResolveError> {
        self.with_retry(&request, |response| Ok(response.body)).await
    }

    /// 获取JSON（非200、异常或JSON无法解码时重试）
    pub async fn fetch_json(&self, request: HttpRequest) -> Result<Value, ResolveError> {
        self.with_retry(&request, |response| {
            serde_json::from_str::<Value>(&response.body).map_err(ResolveError::from)
        })
        .await
    }

    /// 读取一次重定向目标
    ///
    /// 3xx 且带 Location 时返回跳转地址（相对地址按原URL补全），
    /// 其余情况及请求失败时返回原URL
    pub async fn resolve_redirect(&self, url: &str, headers: Vec<(String, String)>) -> String {
        let request = HttpRequest::get(url).headers(headers).no_redirect();
        match self.transport.execute(&request).await {
            Ok(response) if response.is_redirect() => match response.header("location") {
                Some(location) => join_location(url, location),
                None => url.to_string(),
            },
            Ok(_) => url.to_string(),
            Err(e) => {
                tracing::warn!("[HTTP] 获取重定向失败: {}，继续使用原URL", e);
                url.to_string()
            }
        }
    }

    /// 跟随全部重定向，返回落地URL
    pub async fn final_url(&self, url: &str, headers: Vec<(String, String)>) -> Result<String, ResolveError> {
        let request = HttpRequest::get(url).headers(headers);
        let response = self.transport.execute(&request).await?;
        Ok(response.final_url)
    }

    async fn with_retry<T, F>(&self, request: &HttpRequest, decode: F) -> Result<T, ResolveError>
    where
        F: Fn(HttpResponse) -> Result<T, ResolveError>,
    {
        let attempts = self.retry.attempts.max(1);
        let mut last_error = ResolveError::Network(format!("请求未发出: {}", request.url));

        for attempt in 1..=attempts {
            match self.transport.execute(request).await {
                Ok(response) if response.is_ok() => match decode(response) {
                    Ok(value) => return Ok(value),
                    Err(e) => {
                        tracing::warn!("[HTTP] 响应处理失败 {}，重试 {}/{}", e, attempt, attempts);
                        last_error = e;
                    }
                },
                Ok(response) => {
                    tracing::warn!("[HTTP] 请求失败 HTTP {}，重试 {}/{}", response.status, attempt, attempts);
                    last_error = ResolveError::HttpStatus {
                        status: response.status,
                        url: request.url.clone(),
                    };
                }
                Err(e) => {
                    tracing::warn!("[HTTP] 请求异常 {}，重试 {}/{}", e, attempt, attempts);
                    last_error = e;
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.retry.delay_after(attempt)).await;
            }
        }

        tracing::error!("[HTTP] {} 次尝试均失败: {}", attempts, request.url);
        Err(last_error)
    }
}

fn join_location(base: &str, location: &str) -> String {
    url::Url::parse(base)
        .and_then(|b| b.join(location))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| location.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::mock::MockTransport;
    use httpmock::prelude::*;

    fn fetcher(transport: Arc<MockTransport>) -> HttpFetcher {
        HttpFetcher::new(
            transport,
            RetryPolicy {
                attempts: 3,
                base_delay: Duration::ZERO,
            },
        )
    }

    #[tokio::test]
    async fn test_fetch_text_retries_exact_attempts() {
        let transport = Arc::new(MockTransport::new().fail("https://a.test/page", "connection reset"));
        let result = fetcher(transport.clone())
            .fetch_text(HttpRequest::get("https://a.test/page"))
            .await;

        assert!(matches!(result, Err(ResolveError::Network(_))));
        assert_eq!(transport.hits("https://a.test/page"), 3);
    }

    #[tokio::test]
    async fn test_fetch_text_non_200_is_http_status() {
        let transport = Arc::new(MockTransport::new().status("https://a.test/gone", 503, ""));
        let result = fetcher(transport.clone())
            .fetch_text(HttpRequest::get("https://a.test/gone"))
            .await;

        assert!(matches!(result, Err(ResolveError::HttpStatus { status: 503, .. })));
        assert_eq!(transport.hits("https://a.test/gone"), 3);
    }

    #[tokio::test]
    async fn test_fetch_json_decodes() {
        let transport = Arc::new(MockTransport::new().ok("https://a.test/api", r#"{"code":0}"#));
        let value = fetcher(transport.clone())
            .fetch_json(HttpRequest::get("https://a.test/api"))
            .await
            .unwrap();

        assert_eq!(value["code"], 0);
        assert_eq!(transport.hits("https://a.test/api"), 1);
    }

    #[tokio::test]
    async fn test_resolve_redirect_reads_location() {
        let transport = Arc::new(
            MockTransport::new()
                .redirect("https://v.douyin.com/abc/", "https://www.iesdouyin.com/share/video/1/")
                .redirect("https://short.test/x", "/landing"),
        );
        let fetcher = fetcher(transport);

        assert_eq!(
            fetcher.resolve_redirect("https://v.douyin.com/abc/", Vec::new()).await,
            "https://www.iesdouyin.com/share/video/1/"
        );
        assert_eq!(
            fetcher.resolve_redirect("https://short.test/x", Vec::new()).await,
            "https://short.test/landing"
        );
        assert_eq!(
            fetcher.resolve_redirect("https://unrouted.test/", Vec::new()).await,
            "https://unrouted.test/"
        );
    }

    #[test]
    fn test_random_user_agent_from_list() {
        let fetcher = HttpFetcher::new(Arc::new(MockTransport::new()), RetryPolicy::default())
            .with_user_agents(vec!["ua-1".to_string(), "ua-2".to_string()]);
        let ua = fetcher.random_user_agent();
        assert!(ua == "ua-1" || ua == "ua-2");

        let empty = HttpFetcher::new(Arc::new(MockTransport::new()), RetryPolicy::default());
        assert_eq!(empty.random_user_agent(), FALLBACK_USER_AGENT);
    }

    #[tokio::test]
    async fn test_reqwest_transport_against_local_server() {
        let server = MockServer::start_async().await;
        let page = server
            .mock_async(|when, then| {
                when.method(GET).path("/page").header("user-agent", "ua-test");
                then.status(200).body("<html>ok</html>");
            })
            .await;
        let jump = server
            .mock_async(|when, then| {
                when.method(GET).path("/jump");
                then.status(302).header("Location", "/page");
            })
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();

        let request = HttpRequest::get(server.url("/page")).header("User-Agent", "ua-test");
        let response = transport.execute(&request).await.unwrap();
        assert!(response.is_ok());
        assert_eq!(response.body, "<html>ok</html>");
        page.assert_async().await;

        let request = HttpRequest::get(server.url("/jump")).no_redirect();
        let response = transport.execute(&request).await.unwrap();
        assert_eq!(response.status, 302);
        assert_eq!(response.header("Location"), Some("/page"));
        jump.assert_async().await;
    }
}
