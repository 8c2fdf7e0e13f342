//! 聚合接口解析策略
//!
//! 微博、今日头条、皮皮虾（以及配置开启时的快手）不直接抓取页面，
//! 而是调用第三方聚合接口：`GET {api_base}/{endpoint}?url=<分享链接>`
//!
//! # 响应结构
//!
//! ```json
//! {"code": 200, "msg": "success", "data": {"type": 1, "title": "...", "url": "...", "cover": "..."}}
//! ```
//!
//! 类型判定：`1 | "1" | "video"` 为视频，`2 | "2" | "image" | "images"` 为图集，
//! 其余情况若带视频地址字段则按视频处理，否则为未知类型。

use crate::core::{ContentKind, MediaDescriptor, PlatformType, ResolveError};
use crate::platforms::embedded::first_str;
use crate::platforms::http_client::{HttpFetcher, HttpRequest};
use crate::platforms::traits::ResolveStrategy;
use crate::platforms::utils::{build_url, preview};
use serde_json::Value;

/// 聚合接口策略
pub struct AggregatorStrategy {
    platform: PlatformType,
    endpoint: String,
    fetcher: HttpFetcher,
    /// 宽松模式：`code` 不是200时把整个响应体当作数据
    lenient: bool,
}

impl AggregatorStrategy {
    /// # 参数
    ///
    /// * `platform` - 平台类型
    /// * `endpoint` - 完整接口地址（不含查询串）
    /// * `fetcher` - 请求器
    pub fn new(platform: PlatformType, endpoint: impl Into<String>, fetcher: HttpFetcher) -> Self {
        Self {
            platform,
            endpoint: endpoint.into(),
            fetcher,
            lenient: false,
        }
    }

    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// 取出响应中的数据部分
    fn unwrap_envelope<'a>(&self, body: &'a Value) -> Result<&'a Value, ResolveError> {
        let data = body.get("data").filter(|d| !d.is_null());
        match body.get("code") {
            Some(code) if is_success_code(code) => data.ok_or_else(|| self.empty_data()),
            None if data.is_some() => data.ok_or_else(|| self.empty_data()),
            _ if self.lenient => Ok(body),
            code => Err(ResolveError::Api {
                platform: self.platform,
                code: code.and_then(|c| c.as_i64()).unwrap_or(-1),
                message: first_str(body, &["/msg", "/message"]).unwrap_or_default(),
            }),
        }
    }

    fn empty_data(&self) -> ResolveError {
        ResolveError::extraction(self.platform, "接口返回数据为空")
    }
}

fn is_success_code(code: &Value) -> bool {
    code.as_i64() == Some(200) || code.as_str() == Some("200")
}

/// 按类型标记判定内容类型
///
/// 带视频地址时一律视为视频，类型标记只在没有视频地址时生效
pub fn classify(data: &Value) -> ContentKind {
    if has_tag(data, 1, &["1", "video"]) || video_url(data).is_some() {
        ContentKind::Video
    } else if has_tag(data, 2, &["2", "image", "images"]) {
        ContentKind::ImageGallery
    } else {
        ContentKind::Unknown
    }
}

fn has_tag(data: &Value, number: i64, names: &[&str]) -> bool {
    match data.get("type") {
        Some(Value::Number(n)) => n.as_i64() == Some(number),
        Some(Value::String(s)) => names.contains(&s.as_str()),
        _ => false,
    }
}

fn video_url(data: &Value) -> Option<String> {
    first_str(data, &["/videoUrl", "/url"])
}

/// 读取字符串列表，元素可以是字符串或带 `url` 字段的对象
fn url_list(data: &Value, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .filter_map(|key| data.get(*key).and_then(|v| v.as_array()))
        .find(|arr| !arr.is_empty())
        .map(|arr| {
            arr.iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(_) => first_str(item, &["/url"]),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// 把聚合接口数据整理为统一描述
///
/// 判定为视频/图集但缺少对应地址时降级为未知类型
pub fn reshape(platform: PlatformType, data: &Value) -> MediaDescriptor {
    let images = url_list(data, &["images", "imageList"]);

    let desc = match classify(data) {
        ContentKind::Video => match video_url(data) {
            Some(url) => MediaDescriptor::video(platform, url).with_backup_urls(url_list(data, &["video_backup"])),
            None => MediaDescriptor::unknown(platform),
        },
        ContentKind::ImageGallery if !images.is_empty() => {
            MediaDescriptor::gallery(platform, images).with_live_photos(url_list(data, &["live_photo"]))
        }
        _ => MediaDescriptor::unknown(platform),
    };

    let author = first_str(data, &["/author/name", "/author/nickname", "/nickName"]).unwrap_or_default();
    let avatar = first_str(data, &["/author/avatar", "/avatar"]);

    desc.with_title(first_str(data, &["/title"]).unwrap_or_default())
        .with_author(author)
        .with_avatar(avatar)
        .with_cover(first_str(data, &["/cover"]))
        .with_source_id(first_str(data, &["/id"]))
}

#[async_trait::async_trait]
impl ResolveStrategy for AggregatorStrategy {
    async fn resolve(&self, url: &str) -> Result<MediaDescriptor, ResolveError> {
        let tag = self.platform.display_name();
        let api_url = build_url(&self.endpoint, &[("url", url)]);
        tracing::info!("[{}] 请求聚合接口: {}", tag, api_url);

        let request = HttpRequest::get(api_url).header("User-Agent", self.fetcher.random_user_agent());
        let body = self.fetcher.fetch_json(request).await?;
        tracing::debug!("[{}] 接口返回: {}", tag, preview(&body.to_string(), 300));

        let data = self.unwrap_envelope(&body)?;
        if data.as_object().map_or(true, |o| o.is_empty()) {
            return Err(self.empty_data());
        }

        let desc = reshape(self.platform, data);
        tracing::info!("[{}] 解析成功: {:?}", tag, desc.content_kind);
        Ok(desc)
    }

    fn platform_type(&self) -> PlatformType {
        self.platform
    }
}
