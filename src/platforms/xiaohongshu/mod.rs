//! 小红书平台模块
//!
//! 抓取笔记页面，识别验证码页面后直接失败，否则解析 `window.__INITIAL_STATE__`，
//! 失败时回退正则匹配。

pub mod extractor;

use crate::core::{MediaDescriptor, PlatformType, ResolveError};
use crate::platforms::http_client::{HttpFetcher, HttpRequest};
use crate::platforms::stages::{run_stages, StageList};
use crate::platforms::traits::{ExtractionStage, ResolveStrategy};
use crate::platforms::utils::browser_headers;
use std::sync::Arc;

/// 验证码页面特征
const CAPTCHA_MARKERS: [&str; 2] = ["验证码", "captcha"];

/// 是否为验证码页面
pub fn is_captcha_page(html: &str) -> bool {
    CAPTCHA_MARKERS.iter().any(|marker| html.contains(*marker))
}

/// 小红书解析策略
pub struct XiaohongshuStrategy {
    fetcher: HttpFetcher,
    stages: StageList,
}

impl XiaohongshuStrategy {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self::with_stages(
            fetcher,
            vec![
                Arc::new(extractor::InitialStateStage) as Arc<dyn ExtractionStage>,
                Arc::new(extractor::RegexStage),
            ],
        )
    }

    pub fn with_stages(fetcher: HttpFetcher, stages: StageList) -> Self {
        Self { fetcher, stages }
    }
}

#[async_trait::async_trait]
impl ResolveStrategy for XiaohongshuStrategy {
    async fn resolve(&self, url: &str) -> Result<MediaDescriptor, ResolveError> {
        tracing::info!("[小红书] 开始解析: {}", url);
        let request = HttpRequest::get(url)
            .headers(browser_headers(&self.fetcher.random_user_agent()))
            .header("Cache-Control", "max-age=0");
        let html = self.fetcher.fetch_text(request).await?;

        if is_captcha_page(&html) {
            tracing::error!("[小红书] 遇到验证码页面，停止解析");
            return Err(ResolveError::Captcha {
                platform: PlatformType::Xiaohongshu,
            });
        }

        run_stages(PlatformType::Xiaohongshu, &self.stages, &html)
            .ok_or_else(|| ResolveError::extraction(PlatformType::Xiaohongshu, "所有解析方法均失败"))
    }

    fn platform_type(&self) -> PlatformType {
        PlatformType::Xiaohongshu
    }
}

#[cfg(test)]
mod tests {
    use super::extractor::fixtures::*;
    use super::*;
    use crate::core::{ContentKind, RetryPolicy};
    use crate::platforms::mock::MockTransport;
    use crate::platforms::stages::test_support::CountingStage;
    use std::time::Duration;

    const NOTE: &str = "https://www.xiaohongshu.com/explore/64f0a1";

    fn counting_strategy(
        transport: Arc<MockTransport>,
    ) -> (XiaohongshuStrategy, Arc<CountingStage>, Arc<CountingStage>) {
        let structured = CountingStage::wrap(Arc::new(extractor::InitialStateStage));
        let regex = CountingStage::wrap(Arc::new(extractor::RegexStage));
        let strategy = XiaohongshuStrategy::with_stages(
            HttpFetcher::new(transport, RetryPolicy { attempts: 3, base_delay: Duration::ZERO }),
            vec![structured.clone() as Arc<dyn ExtractionStage>, regex.clone()],
        );
        (strategy, structured, regex)
    }

    #[test]
    fn test_captcha_markers() {
        assert!(is_captcha_page(CAPTCHA_PAGE));
        assert!(is_captcha_page("<div id=\"captcha\"></div>"));
        assert!(!is_captcha_page(GALLERY_PAGE));
    }

    #[tokio::test]
    async fn test_captcha_short_circuits_before_any_stage() {
        let transport = Arc::new(MockTransport::new().ok(NOTE, CAPTCHA_PAGE));
        let (strategy, structured, regex) = counting_strategy(transport.clone());

        let err = strategy.resolve(NOTE).await.unwrap_err();
        assert!(matches!(err, ResolveError::Captcha { platform: PlatformType::Xiaohongshu }));
        assert_eq!(err.status_code(), 404);
        assert_eq!(structured.calls(), 0);
        assert_eq!(regex.calls(), 0);
        // 验证码不重试
        assert_eq!(transport.hits(NOTE), 1);
    }

    #[tokio::test]
    async fn test_structured_success_skips_regex() {
        let transport = Arc::new(MockTransport::new().ok(NOTE, GALLERY_PAGE));
        let (strategy, structured, regex) = counting_strategy(transport);

        let desc = strategy.resolve(NOTE).await.unwrap();
        assert_eq!(desc.content_kind, ContentKind::ImageGallery);
        assert_eq!((structured.calls(), regex.calls()), (1, 0));
    }
}
