// 主入口点 - 命令行解析分享链接
// Main entry point: resolve a share link from the command line
//
// 用法: video-link-resolver <分享文字...>
// 配置文件路径通过环境变量 VIDEO_RESOLVER_CONFIG 指定（可选）

use video_link_resolver::{init_tracing, ResolutionResult, ResolverConfig, VideoResolver};

const CONFIG_ENV: &str = "VIDEO_RESOLVER_CONFIG";

fn load_config() -> ResolverConfig {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => ResolverConfig::from_file(&path).unwrap_or_else(|e| {
            tracing::error!("[App] 读取配置 {} 失败: {}，使用默认配置", path, e);
            ResolverConfig::default()
        }),
        Err(_) => ResolverConfig::default(),
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    tracing::info!("[App] 启动");

    let config = load_config();
    let text = std::env::args().skip(1).collect::<Vec<_>>().join(" ");

    let result = if !config.enable_video_parse {
        ResolutionResult::failure(ResolutionResult::BAD_REQUEST, "视频解析功能已关闭")
    } else {
        match VideoResolver::from_config(&config) {
            Ok(resolver) => resolver.resolve(&text).await,
            Err(e) => ResolutionResult::failure(ResolutionResult::INTERNAL_ERROR, format!("解析异常: {}", e)),
        }
    };

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!("[App] 结果序列化失败: {}", e),
    }

    if !result.success {
        std::process::exit(1);
    }
}
