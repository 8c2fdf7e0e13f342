//! 小红书页面提取阶段

use crate::core::{MediaDescriptor, PlatformType, UNTITLED};
use crate::platforms::embedded::{self, first_match, first_str, non_empty_array, Probe};
use crate::platforms::traits::ExtractionStage;
use crate::platforms::utils::{capture_all, capture_first, decode_text, dedup_preserve_order, unescape_url};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// 内嵌数据标记
pub const INITIAL_STATE_MARKER: &str = "window.__INITIAL_STATE__";

/// 视频CDN地址前缀
pub const VIDEO_CDN: &str = "https://sns-video-bd.xhscdn.com/";

static ORIGIN_VIDEO_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""originVideoKey":"([^"]+)""#).expect("invalid originVideoKey regex"));
static URL_DEFAULT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""urlDefault":"([^"]+)""#).expect("invalid urlDefault regex"));
static DESC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""desc":"([^"]+)""#).expect("invalid desc regex"));
static NICK_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""nickName":"([^"]+)""#).expect("invalid nickName regex"));

/// 详情页布局：`note.noteDetailMap` 的第一个笔记
fn note_detail_map(tree: &Value) -> Option<&Value> {
    tree.pointer("/note/noteDetailMap")?
        .as_object()?
        .values()
        .next()
        .and_then(|entry| entry.get("note"))
        .filter(|note| note.is_object())
}

fn note_data(tree: &Value) -> Option<&Value> {
    tree.pointer("/noteData/data/noteData").filter(|note| note.is_object())
}

fn page_props_note(tree: &Value) -> Option<&Value> {
    tree.pointer("/props/pageProps/noteData").filter(|note| note.is_object())
}

fn root_note(tree: &Value) -> Option<&Value> {
    tree.get("note").filter(|note| note.is_object())
}

const NOTE_PROBES: [Probe; 4] = [note_detail_map, note_data, page_props_note, root_note];

/// 视频流地址：h265 -> h264 -> originVideoKey
fn video_stream_url(note: &Value) -> Option<String> {
    first_str(
        note,
        &["/video/media/stream/h265/0/masterUrl", "/video/media/stream/h264/0/masterUrl"],
    )
    .or_else(|| first_str(note, &["/video/consumer/originVideoKey"]).map(|key| format!("{}{}", VIDEO_CDN, key)))
}

/// 单张图片地址
fn image_url(image: &Value) -> Option<String> {
    first_str(
        image,
        &[
            "/urlDefault",
            "/url",
            "/infoList/0/url",
            "/stream/h264/0/masterUrl",
            "/stream/h265/0/masterUrl",
        ],
    )
}

/// 从笔记节点构建描述
pub fn descriptor_from_note(note: &Value) -> Option<MediaDescriptor> {
    let note_type = embedded::str_at(note, "/type").unwrap_or("normal");
    let images = non_empty_array(note, "/imageList");

    let desc = if note_type == "video" {
        let cover = images.and_then(|list| list.first()).and_then(image_url);
        MediaDescriptor::video(PlatformType::Xiaohongshu, video_stream_url(note)?).with_cover(cover)
    } else if note_type == "normal" || images.is_some() {
        let image_urls: Vec<String> = images?.iter().filter_map(image_url).collect();
        if image_urls.is_empty() {
            return None;
        }
        MediaDescriptor::gallery(PlatformType::Xiaohongshu, image_urls)
    } else {
        return None;
    };

    let title = first_str(note, &["/desc", "/title"]).unwrap_or_else(|| UNTITLED.to_string());
    let author = first_str(note, &["/user/nickName", "/user/nickname", "/user/name"]).unwrap_or_default();
    Some(
        desc.with_title(title)
            .with_author(author)
            .with_avatar(first_str(note, &["/user/avatar"]))
            .with_source_id(first_str(note, &["/noteId", "/id"])),
    )
}

/// 结构化阶段：`window.__INITIAL_STATE__`（`undefined` 视为 `null`）
#[derive(Debug, Default)]
pub struct InitialStateStage;

impl ExtractionStage for InitialStateStage {
    fn name(&self) -> &'static str {
        "__INITIAL_STATE__"
    }

    fn extract(&self, html: &str) -> Option<MediaDescriptor> {
        let tree = embedded::parse_embedded_state(html, INITIAL_STATE_MARKER, true)?;
        let note = first_match(&tree, &NOTE_PROBES)?;
        descriptor_from_note(note)
    }
}

/// 正则阶段：`originVideoKey` 视频，其次 `urlDefault` 图片
#[derive(Debug, Default)]
pub struct RegexStage;

impl ExtractionStage for RegexStage {
    fn name(&self) -> &'static str {
        "正则匹配"
    }

    fn extract(&self, html: &str) -> Option<MediaDescriptor> {
        let desc = if let Some(key) = capture_first(&ORIGIN_VIDEO_KEY_RE, html) {
            MediaDescriptor::video(PlatformType::Xiaohongshu, format!("{}{}", VIDEO_CDN, unescape_url(&key)))
        } else {
            let images = dedup_preserve_order(
                capture_all(&URL_DEFAULT_RE, html)
                    .iter()
                    .map(|u| unescape_url(u))
                    .collect(),
            );
            if images.is_empty() {
                return None;
            }
            MediaDescriptor::gallery(PlatformType::Xiaohongshu, images)
        };

        let title = capture_first(&DESC_RE, html)
            .map(|t| decode_text(&t))
            .unwrap_or_else(|| UNTITLED.to_string());
        let author = capture_first(&NICK_NAME_RE, html)
            .map(|a| decode_text(&a))
            .unwrap_or_default();
        Some(desc.with_title(title).with_author(author))
    }
}
