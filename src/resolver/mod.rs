//! 链接解析入口
//!
//! 组合链接提取、平台识别、策略调用与结果归一化，对外只暴露
//! [`VideoResolver::resolve`]，任何情况下都返回 [`ResolutionResult`] 而不是错误。
//!
//! # 状态码
//!
//! | code | 含义 |
//! |---|---|
//! | 200 | 解析成功 |
//! | 400 | 输入为空、没有链接或平台不支持 |
//! | 404 | 平台已识别但解析失败 |
//! | 500 | 解析过程中出现意外错误 |

pub mod classify;
pub mod extract;
pub mod normalize;

pub use classify::{classify, DOMAIN_TABLE};
pub use extract::extract_url;

use crate::core::{PlatformType, ResolutionResult, ResolveError, ResolverConfig};
use crate::platforms::StrategyRegistry;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// 链接解析器
///
/// 只持有不可变的策略注册表，可在多个任务间共享
#[derive(Clone)]
pub struct VideoResolver {
    registry: StrategyRegistry,
}

impl VideoResolver {
    pub fn new(registry: StrategyRegistry) -> Self {
        Self { registry }
    }

    /// 按配置创建（真实网络）
    pub fn from_config(config: &ResolverConfig) -> Result<Self, ResolveError> {
        Ok(Self::new(StrategyRegistry::from_config(config)?))
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// 解析用户输入
    ///
    /// # 参数
    ///
    /// * `text` - 用户原始输入，可以夹带其他文字
    ///
    /// # 返回
    ///
    /// 统一的结果信封，`data` 仅在成功时存在
    pub async fn resolve(&self, text: &str) -> ResolutionResult {
        let text = text.trim();
        if text.is_empty() {
            return ResolutionResult::failure(ResolutionResult::BAD_REQUEST, "请输入视频链接");
        }

        let Some(url) = extract_url(text) else {
            return ResolutionResult::failure(ResolutionResult::BAD_REQUEST, "未找到有效的视频链接");
        };

        let platform = classify(url);
        tracing::info!("[Resolver] 识别到平台: {}, URL: {}", platform.id(), url);
        if platform == PlatformType::Unknown {
            return normalize::unsupported_platform(&self.registry.supported_platforms());
        }

        let Some(strategy) = self.registry.get(platform) else {
            return ResolutionResult::failure(
                ResolutionResult::BAD_REQUEST,
                format!("平台 {} 未配置解析器", platform),
            );
        };

        match AssertUnwindSafe(strategy.resolve(url)).catch_unwind().await {
            Ok(outcome) => normalize::normalize(platform, outcome),
            Err(payload) => normalize::from_panic(platform, payload),
        }
    }
}
