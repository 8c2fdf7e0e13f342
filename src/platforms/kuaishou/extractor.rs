//! 快手页面提取阶段

use crate::core::{MediaDescriptor, PlatformType, UNTITLED};
use crate::platforms::embedded::{self, first_match, first_str, non_empty_array, Probe};
use crate::platforms::traits::ExtractionStage;
use crate::platforms::utils::{capture_all, capture_first, decode_text, unescape_url};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// 内嵌数据标记
pub const INIT_STATE_MARKER: &str = "window.INIT_STATE";

static MAIN_MV_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""mainMvUrls"\s*:\s*\[\s*\{\s*"url"\s*:\s*"([^"]+)""#).expect("invalid mainMvUrls regex")
});
static ATLAS_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)"atlas"\s*:\s*\{[^}]*"list"\s*:\s*\[([^\]]+)\]"#).expect("invalid atlas regex")
});
static QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)""#).expect("invalid quoted regex"));
static CDN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""cdn"\s*:\s*\[\s*"([^"]+)""#).expect("invalid cdn regex"));
static CAPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""caption"\s*:\s*"([^"]+)""#).expect("invalid caption regex"));
static USER_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""userName"\s*:\s*"([^"]+)""#).expect("invalid userName regex"));

/// 图集地址：`https://{cdn}{path}`
pub fn atlas_url(cdn: &str, path: &str) -> String {
    format!("https://{}{}", cdn, path)
}

/// 混淆键名布局：`tusjoh...` 开头的节点下的 photo
fn obfuscated_key_photo(tree: &Value) -> Option<&Value> {
    tree.as_object()?
        .iter()
        .find(|(key, _)| key.starts_with("tusjoh"))
        .and_then(|(_, node)| node.get("photo"))
        .filter(|photo| photo.is_object())
}

fn root_photo(tree: &Value) -> Option<&Value> {
    tree.get("photo").filter(|photo| photo.is_object())
}

fn page_props_photo(tree: &Value) -> Option<&Value> {
    tree.pointer("/props/pageProps/photo").filter(|photo| photo.is_object())
}

const PHOTO_PROBES: [Probe; 3] = [obfuscated_key_photo, root_photo, page_props_photo];

/// 从 photo 节点构建描述
pub fn descriptor_from_photo(photo: &Value) -> Option<MediaDescriptor> {
    let title = first_str(photo, &["/caption"]).unwrap_or_else(|| UNTITLED.to_string());
    let author = first_str(photo, &["/userName"]).unwrap_or_default();

    let desc = if let Some(play_url) = first_str(photo, &["/mainMvUrls/0/url"]) {
        let backups: Vec<String> = non_empty_array(photo, "/mainMvUrls")
            .map(|urls| {
                urls.iter()
                    .skip(1)
                    .filter_map(|u| embedded::str_at(u, "/url"))
                    .map(|u| u.to_string())
                    .collect()
            })
            .unwrap_or_default();
        MediaDescriptor::video(PlatformType::Kuaishou, play_url)
            .with_backup_urls(backups)
            .with_cover(first_str(photo, &["/coverUrls/0/url", "/coverUrl"]))
    } else {
        let atlas = photo.pointer("/ext_params/atlas")?;
        let cdn = first_str(atlas, &["/cdn/0"]).unwrap_or_default();
        let images: Vec<String> = embedded::str_list_at(atlas, "/list")
            .iter()
            .map(|path| atlas_url(&cdn, path))
            .collect();
        if images.is_empty() {
            return None;
        }
        MediaDescriptor::gallery(PlatformType::Kuaishou, images)
    };

    Some(
        desc.with_title(title)
            .with_author(author)
            .with_avatar(first_str(photo, &["/headUrl"]))
            .with_source_id(first_str(photo, &["/photoId", "/id"])),
    )
}

/// 结构化阶段：`window.INIT_STATE`
#[derive(Debug, Default)]
pub struct InitStateStage;

impl ExtractionStage for InitStateStage {
    fn name(&self) -> &'static str {
        "INIT_STATE"
    }

    fn extract(&self, html: &str) -> Option<MediaDescriptor> {
        let tree = embedded::parse_embedded_state(html, INIT_STATE_MARKER, false)?;
        let photo = first_match(&tree, &PHOTO_PROBES)?;
        descriptor_from_photo(photo)
    }
}

/// 正则阶段：`mainMvUrls` 视频，其次 `atlas.list` 图集
#[derive(Debug, Default)]
pub struct RegexStage;

fn caption_and_user(html: &str) -> (String, String) {
    let title = capture_first(&CAPTION_RE, html)
        .map(|t| decode_text(&t))
        .unwrap_or_else(|| UNTITLED.to_string());
    let author = capture_first(&USER_NAME_RE, html)
        .map(|a| decode_text(&a))
        .unwrap_or_default();
    (title, author)
}

impl ExtractionStage for RegexStage {
    fn name(&self) -> &'static str {
        "正则匹配"
    }

    fn extract(&self, html: &str) -> Option<MediaDescriptor> {
        if let Some(play) = capture_first(&MAIN_MV_RE, html) {
            let (title, author) = caption_and_user(html);
            return Some(
                MediaDescriptor::video(PlatformType::Kuaishou, unescape_url(&play))
                    .with_title(title)
                    .with_author(author),
            );
        }

        let list = capture_first(&ATLAS_LIST_RE, html)?;
        let paths = capture_all(&QUOTED_RE, &list);
        if paths.is_empty() {
            return None;
        }
        let cdn = capture_first(&CDN_RE, html).unwrap_or_default();
        let images = paths
            .iter()
            .map(|path| atlas_url(&cdn, &unescape_url(path)))
            .collect();
        let (title, author) = caption_and_user(html);
        Some(
            MediaDescriptor::gallery(PlatformType::Kuaishou, images)
                .with_title(title)
                .with_author(author),
        )
    }
}
