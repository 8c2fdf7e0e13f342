//! 快手平台模块
//!
//! 直接抓取分享页，解析 `window.INIT_STATE`，失败时回退正则匹配。
//! 配置 `kuaishou_via_aggregator` 时改由 [`crate::platforms::aggregator`] 处理。

pub mod extractor;

use crate::core::{MediaDescriptor, PlatformType, ResolveError};
use crate::platforms::http_client::{HttpFetcher, HttpRequest};
use crate::platforms::stages::{run_stages, StageList};
use crate::platforms::traits::{ExtractionStage, ResolveStrategy};
use crate::platforms::utils::browser_headers;
use std::sync::Arc;

/// 快手解析策略
pub struct KuaishouStrategy {
    fetcher: HttpFetcher,
    stages: StageList,
}

impl KuaishouStrategy {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self::with_stages(
            fetcher,
            vec![
                Arc::new(extractor::InitStateStage) as Arc<dyn ExtractionStage>,
                Arc::new(extractor::RegexStage),
            ],
        )
    }

    pub fn with_stages(fetcher: HttpFetcher, stages: StageList) -> Self {
        Self { fetcher, stages }
    }
}

#[async_trait::async_trait]
impl ResolveStrategy for KuaishouStrategy {
    async fn resolve(&self, url: &str) -> Result<MediaDescriptor, ResolveError> {
        tracing::info!("[快手] 开始解析: {}", url);
        let headers = browser_headers(&self.fetcher.random_user_agent());

        let final_url = self.fetcher.resolve_redirect(url, headers.clone()).await;
        tracing::info!("[快手] 最终URL: {}", final_url);

        let html = self
            .fetcher
            .fetch_text(HttpRequest::get(&final_url).headers(headers))
            .await?;

        run_stages(PlatformType::Kuaishou, &self.stages, &html)
            .ok_or_else(|| ResolveError::extraction(PlatformType::Kuaishou, "所有解析方法均失败"))
    }

    fn platform_type(&self) -> PlatformType {
        PlatformType::Kuaishou
    }
}
