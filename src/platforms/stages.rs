//! 提取阶段调度

use crate::core::{MediaDescriptor, PlatformType};
use crate::platforms::traits::ExtractionStage;
use std::sync::Arc;

/// 共享的阶段列表
pub type StageList = Vec<Arc<dyn ExtractionStage>>;

/// 按顺序执行提取阶段，返回第一个成功且满足类型约束的结果
pub fn run_stages(platform: PlatformType, stages: &[Arc<dyn ExtractionStage>], html: &str) -> Option<MediaDescriptor> {
    for stage in stages {
        match stage.extract(html) {
            Some(desc) if desc.is_well_formed() => {
                tracing::info!("[{}] {} 提取成功: {:?}", platform, stage.name(), desc.content_kind);
                return Some(desc);
            }
            Some(desc) => {
                tracing::warn!("[{}] {} 结果不完整({:?})，尝试下一阶段", platform, stage.name(), desc.content_kind);
            }
            None => {
                tracing::warn!("[{}] {} 未找到数据，尝试下一阶段", platform, stage.name());
            }
        }
    }
    None
}
