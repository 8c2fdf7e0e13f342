// Platforms module
// 平台模块
//
// 提供各平台（抖音、快手、B站、小红书、微博、今日头条、皮皮虾）的解析策略实现
// 使用注册表按平台类型分发
//
// # 模块结构
//
// - [traits](traits/index.html) - 解析策略与提取阶段接口
// - [factory](factory/index.html) - 策略注册表
// - [http_client](http_client/index.html) - 带重试的共享HTTP客户端
// - [embedded](embedded/index.html) - 页面内嵌JSON提取
// - 各平台子模块

pub mod aggregator;
pub mod bilibili;
pub mod douyin;
pub mod embedded;
pub mod factory;
pub mod http_client;
pub mod kuaishou;
pub mod stages;
pub mod traits;
pub mod utils;
pub mod xiaohongshu;

#[cfg(test)]
pub(crate) mod mock;

pub use factory::{StrategyRegistry, StrategyRegistryBuilder};
pub use http_client::{HttpFetcher, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use traits::{ExtractionStage, ResolveStrategy};
