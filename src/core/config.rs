//! 解析器配置
//!
//! 对应插件配置中 `video_parse` 一节，JSON 格式
//!
//! # JSON结构示例
//!
//! ```json
//! {
//!     "enable_video_parse": true,
//!     "retry_attempts": 3,
//!     "retry_base_delay_ms": 1000,
//!     "request_timeout_secs": 15,
//!     "aggregator_api_base": "https://api.bugpk.com/api",
//!     "aggregator_endpoints": {"weibo": "weibo"}
//! }
//! ```

use super::{PlatformType, ResolveError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 默认轮换的 User-Agent
const DEFAULT_USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (iPhone; CPU iPhone OS 16_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 13; SM-S918B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/112.0.0.0 Mobile Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
];

/// 解析器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// 视频解析总开关
    pub enable_video_parse: bool,
    /// 每个请求的最大尝试次数
    pub retry_attempts: u32,
    /// 重试基础间隔（毫秒），第 n 次失败后等待 n 倍
    pub retry_base_delay_ms: u64,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 聚合解析接口地址
    pub aggregator_api_base: String,
    /// 平台标识 -> 聚合接口路径
    pub aggregator_endpoints: IndexMap<String, String>,
    /// 快手改走聚合接口
    pub kuaishou_via_aggregator: bool,
    /// 轮换使用的 User-Agent 列表
    pub user_agents: Vec<String>,
    /// 图集最多预览张数
    pub max_gallery_preview: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            enable_video_parse: true,
            retry_attempts: 3,
            retry_base_delay_ms: 1000,
            request_timeout_secs: 15,
            aggregator_api_base: "https://api.bugpk.com/api".to_string(),
            aggregator_endpoints: IndexMap::from([
                ("weibo".to_string(), "weibo".to_string()),
                ("toutiao".to_string(), "toutiao".to_string()),
                ("pipixia".to_string(), "pipixia".to_string()),
                ("kuaishou".to_string(), "ksjx".to_string()),
            ]),
            kuaishou_via_aggregator: false,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            max_gallery_preview: 5,
        }
    }
}

impl ResolverConfig {
    /// 从JSON字符串解析配置
    ///
    /// 解析失败时记录错误并返回默认配置
    pub fn from_json(config_json: &str) -> Self {
        if config_json.trim().is_empty() {
            return Self::default();
        }

        match serde_json::from_str(config_json) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("[Config] JSON解析失败: {}, 输入: {}", e, config_json.chars().take(200).collect::<String>());
                Self::default()
            }
        }
    }

    /// 从配置文件读取
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ResolveError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::info!("[Config] 已读取配置文件: {}", path.display());
        Ok(Self::from_json(&content))
    }

    /// 重试策略
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_attempts.max(1),
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }

    /// 单次请求超时
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// 获取平台对应的聚合接口完整地址
    ///
    /// 配置键接受平台标识或简写（如 `ks`、`ppx`）
    pub fn aggregator_url(&self, platform: PlatformType) -> Option<String> {
        self.aggregator_endpoints
            .iter()
            .find(|(key, _)| PlatformType::from_id(key) == Some(platform))
            .map(|(_, endpoint)| {
                format!(
                    "{}/{}",
                    self.aggregator_api_base.trim_end_matches('/'),
                    endpoint.trim_start_matches('/')
                )
            })
    }
}

/// 有界重试策略
///
/// 共尝试 `attempts` 次，第 n 次失败后等待 `base_delay * n`，最后一次失败后不再等待
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// 第 `attempt` 次（从1开始）失败后的等待时长
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        ResolverConfig::default().retry_policy()
    }
}
