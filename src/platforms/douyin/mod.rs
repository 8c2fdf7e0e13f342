//! 抖音平台模块
//!
//! 解析抖音分享链接（短链 / 视频页 / 图文页）
//!
//! # 解析流程
//!
//! 1. 读取短链 `Location` 得到落地页
//! 2. 抓取落地页HTML（有界重试）
//! 3. 依次尝试 [`extractor::RouterDataStage`]、[`extractor::RegexStage`]
//!
//! # 模块结构
//!
//! - [`extractor`] - 页面提取阶段

pub mod extractor;

use crate::core::{MediaDescriptor, PlatformType, ResolveError};
use crate::platforms::http_client::{HttpFetcher, HttpRequest};
use crate::platforms::stages::{run_stages, StageList};
use crate::platforms::traits::{ExtractionStage, ResolveStrategy};
use crate::platforms::utils::browser_headers;
use std::sync::Arc;

/// 抖音解析策略
pub struct DouyinStrategy {
    fetcher: HttpFetcher,
    stages: StageList,
}

impl DouyinStrategy {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self::with_stages(
            fetcher,
            vec![
                Arc::new(extractor::RouterDataStage) as Arc<dyn ExtractionStage>,
                Arc::new(extractor::RegexStage),
            ],
        )
    }

    /// 使用自定义提取阶段（按顺序尝试）
    pub fn with_stages(fetcher: HttpFetcher, stages: StageList) -> Self {
        Self { fetcher, stages }
    }
}

#[async_trait::async_trait]
impl ResolveStrategy for DouyinStrategy {
    async fn resolve(&self, url: &str) -> Result<MediaDescriptor, ResolveError> {
        tracing::info!("[抖音] 开始解析: {}", url);
        let headers = browser_headers(&self.fetcher.random_user_agent());

        let final_url = self.fetcher.resolve_redirect(url, headers.clone()).await;
        tracing::info!("[抖音] 最终URL: {}", final_url);

        let html = self
            .fetcher
            .fetch_text(HttpRequest::get(&final_url).headers(headers))
            .await?;
        tracing::debug!("[抖音] 页面长度: {}", html.len());

        run_stages(PlatformType::Douyin, &self.stages, &html)
            .ok_or_else(|| ResolveError::extraction(PlatformType::Douyin, "所有解析方法均失败"))
    }

    fn platform_type(&self) -> PlatformType {
        PlatformType::Douyin
    }
}
