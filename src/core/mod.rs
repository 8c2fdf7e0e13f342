// Core module - resolver domain types and errors
// 核心模块 - 平台标识、解析结果与错误类型

mod config;
pub use config::{ResolverConfig, RetryPolicy};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 作者缺省值
pub const UNKNOWN_AUTHOR: &str = "未知作者";

/// 标题缺省值（直接抓取的平台使用）
pub const UNTITLED: &str = "无标题";

/// 解析失败时返回给调用方的统一提示
pub const RESOLVE_FAILED_MESSAGE: &str = "解析失败，请检查链接是否有效或稍后重试";

/// Platform type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
    Douyin,
    Kuaishou,
    Bilibili,
    Xiaohongshu,
    Weibo,
    Toutiao,
    Pipixia,
    Unknown,
}

impl PlatformType {
    /// 平台标识（用于配置与序列化）
    pub fn id(&self) -> &'static str {
        match self {
            PlatformType::Douyin => "douyin",
            PlatformType::Kuaishou => "kuaishou",
            PlatformType::Bilibili => "bilibili",
            PlatformType::Xiaohongshu => "xiaohongshu",
            PlatformType::Weibo => "weibo",
            PlatformType::Toutiao => "toutiao",
            PlatformType::Pipixia => "pipixia",
            PlatformType::Unknown => "unknown",
        }
    }

    /// Get platform display name
    pub fn display_name(&self) -> String {
        match self {
            PlatformType::Douyin => "抖音",
            PlatformType::Kuaishou => "快手",
            PlatformType::Bilibili => "B站",
            PlatformType::Xiaohongshu => "小红书",
            PlatformType::Weibo => "微博",
            PlatformType::Toutiao => "今日头条",
            PlatformType::Pipixia => "皮皮虾",
            PlatformType::Unknown => "未知平台",
        }.to_string()
    }

    /// 下载媒体时使用的防盗链 Referer
    pub fn referer(&self) -> Option<&'static str> {
        match self {
            PlatformType::Douyin => Some("https://www.douyin.com/"),
            PlatformType::Kuaishou => Some("https://www.kuaishou.com/"),
            PlatformType::Bilibili => Some("https://www.bilibili.com/"),
            PlatformType::Xiaohongshu => Some("https://www.xiaohongshu.com/"),
            PlatformType::Weibo => Some("https://www.weibo.com/"),
            PlatformType::Toutiao => Some("https://www.toutiao.com/"),
            PlatformType::Pipixia => Some("https://www.pipixia.com/"),
            PlatformType::Unknown => None,
        }
    }

    /// Get platform type from string
    pub fn from_id(s: &str) -> Option<PlatformType> {
        match s.to_lowercase().as_str() {
            "douyin" | "dy" => Some(PlatformType::Douyin),
            "kuaishou" | "ks" => Some(PlatformType::Kuaishou),
            "bilibili" | "bili" => Some(PlatformType::Bilibili),
            "xiaohongshu" | "xhs" => Some(PlatformType::Xiaohongshu),
            "weibo" => Some(PlatformType::Weibo),
            "toutiao" => Some(PlatformType::Toutiao),
            "pipixia" | "ppx" => Some(PlatformType::Pipixia),
            _ => None,
        }
    }
}

impl fmt::Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// 内容类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Video,
    ImageGallery,
    Unknown,
}

/// 统一的媒体描述
///
/// 各平台策略解析成功后的输出，与平台无关。
/// `Video` 必须带 `primary_media_url`，`ImageGallery` 必须带非空 `image_urls`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub title: String,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub platform: PlatformType,
    pub content_kind: ContentKind,
    pub primary_media_url: Option<String>,
    pub cover_url: Option<String>,
    pub image_urls: Vec<String>,
    pub backup_media_urls: Vec<String>,
    /// 实况图片（live photo）短片地址
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub live_photo_urls: Vec<String>,
    /// 上游作品ID（BV号、aweme_id、笔记ID等）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

impl MediaDescriptor {
    fn empty(platform: PlatformType, content_kind: ContentKind) -> Self {
        Self {
            title: String::new(),
            author_name: UNKNOWN_AUTHOR.to_string(),
            author_avatar: None,
            platform,
            content_kind,
            primary_media_url: None,
            cover_url: None,
            image_urls: Vec::new(),
            backup_media_urls: Vec::new(),
            live_photo_urls: Vec::new(),
            source_id: None,
        }
    }

    /// 创建视频类型描述
    pub fn video(platform: PlatformType, video_url: impl Into<String>) -> Self {
        let mut desc = Self::empty(platform, ContentKind::Video);
        desc.primary_media_url = Some(video_url.into());
        desc
    }

    /// 创建图集类型描述
    pub fn gallery(platform: PlatformType, image_urls: Vec<String>) -> Self {
        let mut desc = Self::empty(platform, ContentKind::ImageGallery);
        desc.image_urls = image_urls;
        desc
    }

    /// 创建类型未知的描述（聚合接口无法判定类型时）
    pub fn unknown(platform: PlatformType) -> Self {
        Self::empty(platform, ContentKind::Unknown)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// 设置作者名，空字符串保持缺省值
    pub fn with_author(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.author_name = name;
        }
        self
    }

    pub fn with_avatar(mut self, avatar: Option<String>) -> Self {
        self.author_avatar = avatar.filter(|s| !s.is_empty());
        self
    }

    pub fn with_cover(mut self, cover: Option<String>) -> Self {
        self.cover_url = cover.filter(|s| !s.is_empty());
        self
    }

    pub fn with_source_id(mut self, id: Option<String>) -> Self {
        self.source_id = id.filter(|s| !s.is_empty());
        self
    }

    pub fn with_backup_urls(mut self, urls: Vec<String>) -> Self {
        self.backup_media_urls = urls.into_iter().filter(|s| !s.is_empty()).collect();
        self
    }

    pub fn with_live_photos(mut self, urls: Vec<String>) -> Self {
        self.live_photo_urls = urls.into_iter().filter(|s| !s.is_empty()).collect();
        self
    }

    /// 检查描述是否满足类型约束
    pub fn is_well_formed(&self) -> bool {
        let has_video = self.primary_media_url.as_deref().map_or(false, |u| !u.is_empty());
        let has_images = !self.image_urls.is_empty();
        match self.content_kind {
            ContentKind::Video => has_video && !has_images,
            ContentKind::ImageGallery => has_images && !has_video,
            ContentKind::Unknown => true,
        }
    }
}

/// 解析结果信封
///
/// 调用方拿到的唯一返回值，`data` 仅在 `success` 时存在。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub success: bool,
    #[serde(rename = "code")]
    pub status_code: u16,
    pub message: String,
    pub data: Option<MediaDescriptor>,
}

impl ResolutionResult {
    pub const OK: u16 = 200;
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_FOUND: u16 = 404;
    pub const INTERNAL_ERROR: u16 = 500;

    pub fn success(data: MediaDescriptor) -> Self {
        Self {
            success: true,
            status_code: Self::OK,
            message: "解析成功".to_string(),
            data: Some(data),
        }
    }

    pub fn failure(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code,
            message: message.into(),
            data: None,
        }
    }
}

/// Resolver errors
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("输入无效: {0}")]
    InvalidInput(String),

    #[error("暂不支持该平台: {0}")]
    UnsupportedPlatform(String),

    #[error("网络错误: {0}")]
    Network(String),

    #[error("HTTP {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("[{platform}] 遇到验证码页面，请稍后重试")]
    Captcha { platform: PlatformType },

    #[error("[{platform}] 接口返回错误 code={code}: {message}")]
    Api {
        platform: PlatformType,
        code: i64,
        message: String,
    },

    #[error("[{platform}] {reason}")]
    ExtractionFailed {
        platform: PlatformType,
        reason: String,
    },

    #[error("配置错误: {0}")]
    Config(String),

    #[error("{0}")]
    Internal(String),
}

impl ResolveError {
    pub fn extraction(platform: PlatformType, reason: impl Into<String>) -> Self {
        ResolveError::ExtractionFailed {
            platform,
            reason: reason.into(),
        }
    }

    /// 错误对应的对外状态码
    pub fn status_code(&self) -> u16 {
        match self {
            ResolveError::InvalidInput(_) | ResolveError::UnsupportedPlatform(_) => {
                ResolutionResult::BAD_REQUEST
            }
            ResolveError::Network(_)
            | ResolveError::HttpStatus { .. }
            | ResolveError::Captcha { .. }
            | ResolveError::Api { .. }
            | ResolveError::ExtractionFailed { .. } => ResolutionResult::NOT_FOUND,
            ResolveError::Config(_) | ResolveError::Internal(_) => ResolutionResult::INTERNAL_ERROR,
        }
    }
}

impl std::convert::From<reqwest::Error> for ResolveError {
    fn from(e: reqwest::Error) -> Self {
        ResolveError::Network(e.to_string())
    }
}

impl std::convert::From<serde_json::Error> for ResolveError {
    fn from(e: serde_json::Error) -> Self {
        ResolveError::Network(format!("响应JSON解析失败: {}", e))
    }
}

impl std::convert::From<std::io::Error> for ResolveError {
    fn from(e: std::io::Error) -> Self {
        ResolveError::Config(e.to_string())
    }
}
