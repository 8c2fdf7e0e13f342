//! 抖音页面提取阶段
//!
//! - [`RouterDataStage`] - 解析 `window._ROUTER_DATA` 内嵌数据
//! - [`RegexStage`] - 直接对页面文本做正则匹配

use crate::core::{MediaDescriptor, PlatformType, UNTITLED};
use crate::platforms::embedded::{self, first_match, first_str, non_empty_array, str_at, Probe};
use crate::platforms::traits::ExtractionStage;
use crate::platforms::utils::{capture_all, capture_first, decode_text, dedup_preserve_order, unescape_url};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// 内嵌数据标记
pub const ROUTER_DATA_MARKER: &str = "window._ROUTER_DATA";

static PLAY_ADDR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""playAddr"\s*:\s*"([^"]+)""#).expect("invalid playAddr regex"));
static DESC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""desc"\s*:\s*"([^"]+)""#).expect("invalid desc regex"));
static NICKNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""nickname"\s*:\s*"([^"]+)""#).expect("invalid nickname regex"));
static COVER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""cover"\s*:\s*\{[^}]*"url_list"\s*:\s*\["([^"]+)""#).expect("invalid cover regex")
});
static URL_LIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""url_list"\s*:\s*\["([^"]+)""#).expect("invalid url_list regex"));

/// 去水印：playwm -> play，720p -> 1080p
pub fn strip_watermark(url: &str) -> String {
    url.replace("playwm", "play").replace("720p", "1080p")
}

/// 当前布局：`loaderData["video_(id)/page"].videoInfoRes.item_list[0]`
fn loader_page_item(tree: &Value) -> Option<&Value> {
    tree.get("loaderData")?
        .as_object()?
        .iter()
        .find(|(key, _)| (key.contains("video_") || key.contains("note_")) && key.contains("/page"))
        .and_then(|(_, page)| page.pointer("/videoInfoRes/item_list/0"))
}

/// 页面键名变化时：任意 loaderData 节点下的 videoInfoRes
fn any_loader_item(tree: &Value) -> Option<&Value> {
    tree.get("loaderData")?
        .as_object()?
        .values()
        .find_map(|page| page.pointer("/videoInfoRes/item_list/0"))
}

/// 旧布局：根节点 item_list
fn root_item(tree: &Value) -> Option<&Value> {
    tree.pointer("/item_list/0")
}

/// 详情接口布局：aweme_detail
fn aweme_detail(tree: &Value) -> Option<&Value> {
    tree.get("aweme_detail").filter(|v| v.is_object())
}

const ITEM_PROBES: [Probe; 4] = [loader_page_item, any_loader_item, root_item, aweme_detail];

const PLAY_URL_POINTERS: [&str; 4] = [
    "/video/play_addr/url_list/0",
    "/video/playAddr/url_list/0",
    "/video/playAddr/0/src",
    "/video/playApi",
];

/// 从作品节点构建描述
///
/// 图文作品同样带有 `video` 字段（背景音乐），因此先判断 `images`
pub fn descriptor_from_item(item: &Value) -> Option<MediaDescriptor> {
    let title = first_str(item, &["/desc", "/title"]).unwrap_or_else(|| UNTITLED.to_string());
    let author = first_str(item, &["/author/nickname", "/author/nick_name"]).unwrap_or_default();
    let avatar = first_str(item, &["/author/avatar_thumb/url_list/0", "/author/avatar_medium/url_list/0"]);
    let source_id = first_str(item, &["/aweme_id", "/awemeId"]);

    let desc = if let Some(images) = non_empty_array(item, "/images") {
        let image_urls: Vec<String> = images
            .iter()
            .filter_map(|img| str_at(img, "/url_list/0"))
            .map(|u| u.to_string())
            .collect();
        if image_urls.is_empty() {
            return None;
        }
        let live_photos: Vec<String> = images
            .iter()
            .filter_map(|img| str_at(img, "/video/play_addr/url_list/0"))
            .map(strip_watermark)
            .collect();
        MediaDescriptor::gallery(PlatformType::Douyin, image_urls).with_live_photos(live_photos)
    } else {
        let play_url = first_str(item, &PLAY_URL_POINTERS)?;
        let backups: Vec<String> = embedded::str_list_at(item, "/video/play_addr/url_list")
            .into_iter()
            .skip(1)
            .map(|u| strip_watermark(&u))
            .collect();
        MediaDescriptor::video(PlatformType::Douyin, strip_watermark(&play_url))
            .with_backup_urls(backups)
            .with_cover(first_str(item, &["/video/cover/url_list/0", "/video/origin_cover/url_list/0"]))
    };

    Some(
        desc.with_title(title)
            .with_author(author)
            .with_avatar(avatar)
            .with_source_id(source_id),
    )
}

/// 结构化阶段：`window._ROUTER_DATA`
#[derive(Debug, Default)]
pub struct RouterDataStage;

impl ExtractionStage for RouterDataStage {
    fn name(&self) -> &'static str {
        "_ROUTER_DATA"
    }

    fn extract(&self, html: &str) -> Option<MediaDescriptor> {
        let tree = embedded::parse_embedded_state(html, ROUTER_DATA_MARKER, false)?;
        let item = first_match(&tree, &ITEM_PROBES)?;
        descriptor_from_item(item)
    }
}

/// 正则阶段：`playAddr` 视频，其次多个 `url_list` 图集
#[derive(Debug, Default)]
pub struct RegexStage;

impl RegexStage {
    fn title_and_author(html: &str) -> (String, String) {
        let title = capture_first(&DESC_RE, html)
            .map(|t| decode_text(&t))
            .unwrap_or_else(|| UNTITLED.to_string());
        let author = capture_first(&NICKNAME_RE, html)
            .map(|a| decode_text(&a))
            .unwrap_or_default();
        (title, author)
    }
}

impl ExtractionStage for RegexStage {
    fn name(&self) -> &'static str {
        "正则匹配"
    }

    fn extract(&self, html: &str) -> Option<MediaDescriptor> {
        if let Some(play) = capture_first(&PLAY_ADDR_RE, html) {
            let (title, author) = Self::title_and_author(html);
            let cover = capture_first(&COVER_RE, html).map(|c| unescape_url(&c));
            return Some(
                MediaDescriptor::video(PlatformType::Douyin, strip_watermark(&unescape_url(&play)))
                    .with_title(title)
                    .with_author(author)
                    .with_cover(cover),
            );
        }

        let images = capture_all(&URL_LIST_RE, html);
        if images.len() > 1 {
            let (title, author) = Self::title_and_author(html);
            let images = dedup_preserve_order(images.iter().map(|u| unescape_url(u)).collect());
            return Some(
                MediaDescriptor::gallery(PlatformType::Douyin, images)
                    .with_title(title)
                    .with_author(author),
            );
        }

        None
    }
}
