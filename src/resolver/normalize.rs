//! 解析结果归一化
//!
//! 把策略的输出（成功、错误或 panic）统一包装为 [`ResolutionResult`]

use crate::core::{MediaDescriptor, PlatformType, ResolutionResult, ResolveError, RESOLVE_FAILED_MESSAGE};
use std::any::Any;

/// 包装策略输出
///
/// 404 类错误对外只返回统一提示，具体原因写入日志
pub fn normalize(platform: PlatformType, outcome: Result<MediaDescriptor, ResolveError>) -> ResolutionResult {
    match outcome {
        Ok(desc) if desc.is_well_formed() => {
            tracing::info!("[{}] 解析成功: {:?}", platform, desc.content_kind);
            ResolutionResult::success(desc)
        }
        Ok(desc) => {
            tracing::error!("[{}] 解析结果不完整: {:?}", platform, desc);
            ResolutionResult::failure(ResolutionResult::NOT_FOUND, RESOLVE_FAILED_MESSAGE)
        }
        Err(e) => from_error(platform, &e),
    }
}

/// 按错误类型映射状态码
pub fn from_error(platform: PlatformType, error: &ResolveError) -> ResolutionResult {
    let code = error.status_code();
    match code {
        ResolutionResult::NOT_FOUND => {
            tracing::error!("[{}] 解析失败: {}", platform, error);
            ResolutionResult::failure(code, RESOLVE_FAILED_MESSAGE)
        }
        ResolutionResult::INTERNAL_ERROR => {
            tracing::error!("[{}] 解析异常: {}", platform, error);
            ResolutionResult::failure(code, format!("解析异常: {}", error))
        }
        _ => ResolutionResult::failure(code, error.to_string()),
    }
}

/// 策略内部 panic 转为 500
pub fn from_panic(platform: PlatformType, payload: Box<dyn Any + Send>) -> ResolutionResult {
    let text = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "未知错误".to_string());
    from_error(platform, &ResolveError::Internal(text))
}

/// 未识别平台，列出已注册的平台
pub fn unsupported_platform(supported: &[PlatformType]) -> ResolutionResult {
    let names: Vec<String> = supported.iter().map(|p| p.display_name()).collect();
    ResolutionResult::failure(
        ResolutionResult::BAD_REQUEST,
        format!("暂不支持该平台，目前支持：{}", names.join("、")),
    )
}
