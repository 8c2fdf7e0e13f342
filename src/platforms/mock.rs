// 测试用传输层：按URL返回预置响应并记录命中次数

use crate::core::ResolveError;
use crate::platforms::http_client::{HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum MockReply {
    Response { status: u16, headers: HashMap<String, String>, body: String },
    Error(String),
}

#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    routes: HashMap<String, MockReply>,
    hits: Mutex<HashMap<String, usize>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn ok(self, url: &str, body: &str) -> Self {
        self.status(url, 200, body)
    }

    pub(crate) fn status(mut self, url: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            url.to_string(),
            MockReply::Response {
                status,
                headers: HashMap::new(),
                body: body.to_string(),
            },
        );
        self
    }

    pub(crate) fn redirect(mut self, url: &str, location: &str) -> Self {
        self.routes.insert(
            url.to_string(),
            MockReply::Response {
                status: 302,
                headers: HashMap::from([("location".to_string(), location.to_string())]),
                body: String::new(),
            },
        );
        self
    }

    pub(crate) fn fail(mut self, url: &str, message: &str) -> Self {
        self.routes.insert(url.to_string(), MockReply::Error(message.to_string()));
        self
    }

    pub(crate) fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub(crate) fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }

    fn reply(&self, url: &str, follow_redirects: bool, depth: usize) -> Result<HttpResponse, ResolveError> {
        *self.hits.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;

        match self.routes.get(url).cloned() {
            Some(MockReply::Error(message)) => Err(ResolveError::Network(message)),
            Some(MockReply::Response { status, headers, body }) => {
                let response = HttpResponse {
                    status,
                    final_url: url.to_string(),
                    headers,
                    body,
                };
                if follow_redirects && response.is_redirect() && depth < 5 {
                    if let Some(location) = response.header("location") {
                        let next = url::Url::parse(url)
                            .and_then(|b| b.join(location))
                            .map(|u| u.to_string())
                            .unwrap_or_else(|_| location.to_string());
                        return self.reply(&next, true, depth + 1);
                    }
                }
                Ok(response)
            }
            None => Ok(HttpResponse {
                status: 404,
                final_url: url.to_string(),
                headers: HashMap::new(),
                body: String::new(),
            }),
        }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ResolveError> {
        self.reply(&request.url, request.follow_redirects, 0)
    }
}
