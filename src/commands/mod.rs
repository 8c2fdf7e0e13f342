// Commands module - inbound "解析" command surface
// 命令模块 - 群聊「解析」命令的入口

use crate::core::{ContentKind, MediaDescriptor, PlatformType, ResolutionResult, ResolverConfig};
use crate::resolver::VideoResolver;
use once_cell::sync::Lazy;
use serde::Serialize;

/// 进程级默认解析器（默认配置，首次使用时构建）
static DEFAULT_RESOLVER: Lazy<Option<VideoResolver>> = Lazy::new(|| {
    match VideoResolver::from_config(&ResolverConfig::default()) {
        Ok(resolver) => Some(resolver),
        Err(e) => {
            tracing::error!("[Command] 默认解析器初始化失败: {}", e);
            None
        }
    }
});

/// 使用默认解析器解析
pub async fn resolve_video(text: &str) -> ResolutionResult {
    match DEFAULT_RESOLVER.as_ref() {
        Some(resolver) => resolver.resolve(text).await,
        None => ResolutionResult::failure(ResolutionResult::INTERNAL_ERROR, "解析异常: 解析器初始化失败"),
    }
}

// Reply models
// 回复模型

/// 待发送的媒体
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum MediaItem {
    Cover(String),
    Video(String),
    Image(String),
}

/// 解析成功后的回复
#[derive(Debug, Clone, Serialize)]
pub struct ParseReply {
    /// 文字卡片
    pub summary: String,
    /// 按发送顺序排列的媒体
    pub media: Vec<MediaItem>,
    /// 附加提示
    pub notes: Vec<String>,
    /// 下载媒体时使用的请求头
    pub download_headers: Vec<(String, String)>,
}

/// 「解析」命令的处理结果
#[derive(Debug, Clone, Serialize)]
pub enum ParseOutcome {
    Disabled,
    MissingLink,
    Failed { message: String },
    Resolved(ParseReply),
}

impl ParseOutcome {
    /// 首条回复文字
    pub fn reply_text(&self) -> String {
        match self {
            ParseOutcome::Disabled => "视频解析功能已关闭".to_string(),
            ParseOutcome::MissingLink => "请发送要解析的视频链接，例如：解析 https://v.douyin.com/xxx".to_string(),
            ParseOutcome::Failed { message } => format!("解析失败：{}", message),
            ParseOutcome::Resolved(reply) => reply.summary.clone(),
        }
    }
}

/// 处理「解析」命令
///
/// # 参数
///
/// * `resolver` - 解析器
/// * `config` - 解析配置（开关、图集预览张数）
/// * `args` - 命令参数（用户原始文字）
pub async fn handle_parse(resolver: &VideoResolver, config: &ResolverConfig, args: &str) -> ParseOutcome {
    if !config.enable_video_parse {
        return ParseOutcome::Disabled;
    }
    if args.trim().is_empty() {
        return ParseOutcome::MissingLink;
    }

    let result = resolver.resolve(args).await;
    match result.data {
        Some(desc) if result.success => ParseOutcome::Resolved(build_reply(&desc, config.max_gallery_preview)),
        _ => {
            tracing::info!("[Command] 解析失败 code={}: {}", result.status_code, result.message);
            ParseOutcome::Failed { message: result.message }
        }
    }
}

/// 文字卡片
pub fn summary(desc: &MediaDescriptor) -> String {
    format!(
        "🎬 来源: {}\n📝 标题: {}\n👤 作者: {}",
        desc.platform.display_name(),
        desc.title,
        desc.author_name
    )
}

fn build_reply(desc: &MediaDescriptor, max_preview: usize) -> ParseReply {
    let mut media = Vec::new();
    let mut notes = Vec::new();

    match desc.content_kind {
        ContentKind::Video => {
            if let Some(cover) = &desc.cover_url {
                media.push(MediaItem::Cover(cover.clone()));
            }
            if let Some(video) = &desc.primary_media_url {
                media.push(MediaItem::Video(video.clone()));
            }
        }
        ContentKind::ImageGallery => {
            media.extend(desc.image_urls.iter().take(max_preview).cloned().map(MediaItem::Image));
            if desc.image_urls.len() > max_preview {
                notes.push(format!("还有 {} 张图片未显示", desc.image_urls.len() - max_preview));
            }
        }
        ContentKind::Unknown => notes.push("无法识别的内容类型".to_string()),
    }

    ParseReply {
        summary: summary(desc),
        media,
        notes,
        download_headers: download_headers(desc.platform),
    }
}

/// 下载媒体使用的请求头（带平台防盗链 Referer）
pub fn download_headers(platform: PlatformType) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = [
        ("User-Agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"),
        ("Accept", "image/webp,image/apng,image/*,*/*;q=0.8"),
        ("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8"),
        ("Connection", "keep-alive"),
        ("Cache-Control", "no-cache"),
        ("Pragma", "no-cache"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    if let Some(referer) = platform.referer() {
        headers.push(("Referer".to_string(), referer.to_string()));
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RetryPolicy;
    use crate::platforms::douyin::extractor::fixtures as douyin;
    use crate::platforms::mock::MockTransport;
    use crate::platforms::{HttpFetcher, StrategyRegistry};
    use std::sync::Arc;
    use std::time::Duration;

    fn resolver(transport: MockTransport) -> VideoResolver {
        let fetcher = HttpFetcher::new(Arc::new(transport), RetryPolicy { attempts: 1, base_delay: Duration::ZERO });
        VideoResolver::new(StrategyRegistry::with_defaults(fetcher, &ResolverConfig::default()))
    }

    #[tokio::test]
    async fn test_disabled_and_missing_link() {
        let resolver = resolver(MockTransport::new());
        let mut config = ResolverConfig::default();

        let outcome = handle_parse(&resolver, &config, "   ").await;
        assert!(matches!(outcome, ParseOutcome::MissingLink));

        config.enable_video_parse = false;
        let outcome = handle_parse(&resolver, &config, "https://v.douyin.com/x/").await;
        assert!(matches!(outcome, ParseOutcome::Disabled));
        assert_eq!(outcome.reply_text(), "视频解析功能已关闭");
    }

    #[tokio::test]
    async fn test_failure_carries_message() {
        let resolver = resolver(MockTransport::new());
        let outcome = handle_parse(&resolver, &ResolverConfig::default(), "https://example.com/x").await;
        assert!(outcome.reply_text().starts_with("解析失败：暂不支持该平台"));
    }

    #[tokio::test]
    async fn test_video_reply_plan() {
        let transport = MockTransport::new().ok("https://v.douyin.com/abc123/", douyin::VIDEO_PAGE);
        let outcome = handle_parse(&resolver(transport), &ResolverConfig::default(), "https://v.douyin.com/abc123/").await;

        let ParseOutcome::Resolved(reply) = outcome else {
            panic!("expected resolved outcome");
        };
        assert_eq!(reply.summary, "🎬 来源: 抖音\n📝 标题: 周末去爬山\n👤 作者: 山野");
        assert!(matches!(reply.media[0], MediaItem::Cover(_)));
        assert!(matches!(reply.media[1], MediaItem::Video(_)));
        assert!(reply
            .download_headers
            .iter()
            .any(|(k, v)| k == "Referer" && v == "https://www.douyin.com/"));
    }

    #[test]
    fn test_gallery_preview_limit() {
        let images: Vec<String> = (1..=8).map(|i| format!("https://p/{i}.jpg")).collect();
        let desc = MediaDescriptor::gallery(PlatformType::Xiaohongshu, images).with_title("八张图");
        let reply = build_reply(&desc, 5);

        assert_eq!(reply.media.len(), 5);
        assert_eq!(reply.media[4], MediaItem::Image("https://p/5.jpg".to_string()));
        assert_eq!(reply.notes, vec!["还有 3 张图片未显示"]);
    }

    #[test]
    fn test_unknown_kind_note() {
        let reply = build_reply(&MediaDescriptor::unknown(PlatformType::Weibo), 5);
        assert!(reply.media.is_empty());
        assert_eq!(reply.notes, vec!["无法识别的内容类型"]);
    }

    #[test]
    fn test_download_headers_without_referer() {
        let headers = download_headers(PlatformType::Unknown);
        assert!(!headers.iter().any(|(k, _)| k == "Referer"));
    }
}
