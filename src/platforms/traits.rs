//! 解析策略 traits 定义
//!
//! 定义各平台解析策略的通用接口
//! 遵循策略模式，支持不同平台（抖音、快手、B站、小红书等）的链接解析

use crate::core::{MediaDescriptor, PlatformType, ResolveError};

/// 解析策略 trait
///
/// 所有平台的解析策略都需要实现此接口
#[async_trait::async_trait]
pub trait ResolveStrategy: Send + Sync {
    /// 解析分享链接
    ///
    /// # 参数
    ///
    /// * `url` - 从用户输入中提取出的链接
    ///
    /// # 返回
    ///
    /// 统一的媒体描述，或带平台名和原因的错误
    async fn resolve(&self, url: &str) -> Result<MediaDescriptor, ResolveError>;

    /// 获取平台类型
    fn platform_type(&self) -> PlatformType;
}

/// 页面提取阶段 trait
///
/// 一个阶段只负责从页面文本中提取描述，找不到时返回 `None`，
/// 由策略按顺序尝试（结构化阶段在前，正则阶段在后）
pub trait ExtractionStage: Send + Sync {
    /// 阶段名称（用于日志）
    fn name(&self) -> &'static str;

    /// 从页面文本提取媒体描述
    fn extract(&self, html: &str) -> Option<MediaDescriptor>;
}
