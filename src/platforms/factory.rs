//! 解析策略注册表
//!
//! 平台类型到解析策略的不可变映射，启动时构建一次，之后只读。
//! 注册顺序即对外展示的支持平台顺序。
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use video_link_resolver::platforms::factory::StrategyRegistry;
//! use video_link_resolver::core::{PlatformType, ResolverConfig};
//!
//! let registry = StrategyRegistry::from_config(&ResolverConfig::default())?;
//! if let Some(strategy) = registry.get(PlatformType::Douyin) {
//!     let desc = strategy.resolve(url).await?;
//! }
//! ```

use crate::core::{PlatformType, ResolveError, ResolverConfig};
use crate::platforms::aggregator::AggregatorStrategy;
use crate::platforms::bilibili::BilibiliStrategy;
use crate::platforms::douyin::DouyinStrategy;
use crate::platforms::http_client::HttpFetcher;
use crate::platforms::kuaishou::KuaishouStrategy;
use crate::platforms::traits::ResolveStrategy;
use crate::platforms::xiaohongshu::XiaohongshuStrategy;
use indexmap::IndexMap;
use std::sync::Arc;

/// 策略注册表
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: IndexMap<PlatformType, Arc<dyn ResolveStrategy>>,
}

impl StrategyRegistry {
    pub fn builder() -> StrategyRegistryBuilder {
        StrategyRegistryBuilder::default()
    }

    /// 按配置创建真实网络请求器并注册默认策略
    pub fn from_config(config: &ResolverConfig) -> Result<Self, ResolveError> {
        let fetcher = HttpFetcher::from_config(config)?;
        Ok(Self::with_defaults(fetcher, config))
    }

    /// 注册所有内置平台
    ///
    /// # 参数
    ///
    /// * `fetcher` - 所有策略共享的请求器
    /// * `config` - 聚合接口地址、快手解析方式等
    pub fn with_defaults(fetcher: HttpFetcher, config: &ResolverConfig) -> Self {
        let mut builder = Self::builder().register(Arc::new(DouyinStrategy::new(fetcher.clone())));

        builder = match config.aggregator_url(PlatformType::Kuaishou) {
            Some(endpoint) if config.kuaishou_via_aggregator => builder.register(Arc::new(
                AggregatorStrategy::new(PlatformType::Kuaishou, endpoint, fetcher.clone()).lenient(true),
            )),
            _ => builder.register(Arc::new(KuaishouStrategy::new(fetcher.clone()))),
        };

        builder = builder
            .register(Arc::new(BilibiliStrategy::new(fetcher.clone())))
            .register(Arc::new(XiaohongshuStrategy::new(fetcher.clone())));

        for platform in [PlatformType::Weibo, PlatformType::Toutiao, PlatformType::Pipixia] {
            match config.aggregator_url(platform) {
                Some(endpoint) => {
                    builder = builder.register(Arc::new(AggregatorStrategy::new(platform, endpoint, fetcher.clone())));
                }
                None => tracing::warn!("[Registry] {} 未配置聚合接口，跳过注册", platform),
            }
        }

        let registry = builder.build();
        tracing::info!("[Registry] 解析策略初始化完成，支持的平台: {:?}", registry.supported_platforms());
        registry
    }

    /// 获取指定平台的解析策略
    pub fn get(&self, platform: PlatformType) -> Option<Arc<dyn ResolveStrategy>> {
        self.strategies.get(&platform).cloned()
    }

    /// 获取所有支持的平台类型（注册顺序）
    pub fn supported_platforms(&self) -> Vec<PlatformType> {
        self.strategies.keys().copied().collect()
    }

    /// 检查是否支持指定平台
    pub fn is_supported(&self, platform: PlatformType) -> bool {
        self.strategies.contains_key(&platform)
    }
}

/// 注册表构建器
#[derive(Default)]
pub struct StrategyRegistryBuilder {
    strategies: IndexMap<PlatformType, Arc<dyn ResolveStrategy>>,
}

impl StrategyRegistryBuilder {
    /// 注册策略，同一平台重复注册时后者覆盖前者（保留原位置）
    pub fn register(mut self, strategy: Arc<dyn ResolveStrategy>) -> Self {
        let platform = strategy.platform_type();
        tracing::debug!("[Registry] 注册平台 {} 的解析策略", platform);
        self.strategies.insert(platform, strategy);
        self
    }

    pub fn build(self) -> StrategyRegistry {
        StrategyRegistry {
            strategies: self.strategies,
        }
    }
}
