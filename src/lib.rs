// Core modules
// 核心模块
pub mod core;
pub mod platforms;
pub mod resolver;
pub mod commands;

// Re-export the resolver surface for easy access
// 重新导出解析入口以便轻松访问
pub use crate::core::{
    ContentKind, MediaDescriptor, PlatformType, ResolutionResult, ResolveError, ResolverConfig,
};
pub use commands::{handle_parse, resolve_video, ParseOutcome, ParseReply};
pub use resolver::VideoResolver;

// Initialize tracing for logging
// 初始化 tracing 用于日志输出
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_thread_ids(true)
        .with_target(false)
        .init();
}
