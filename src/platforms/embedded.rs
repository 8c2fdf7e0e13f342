//! 页面内嵌状态数据提取
//!
//! 服务端渲染的页面会把首屏数据赋值给全局变量，例如：
//!
//! ```text
//! <script>window._ROUTER_DATA = {"loaderData": {...}};</script>
//! <script>window["_ROUTER_DATA"] = {...};</script>
//! ```
//!
//! 本模块负责：
//!
//! 1. 按主标记和中括号形式的备用标记定位JSON文本
//! 2. 清理对象/数组结尾多余的逗号
//! 3. 解析为 [`serde_json::Value`]
//! 4. 按顺序尝试多个结构探针（[`Probe`]），取第一个命中的节点

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static TRAILING_COMMA_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*\}").expect("invalid trailing comma regex"));

static TRAILING_COMMA_ARRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*\]").expect("invalid trailing comma regex"));

static UNDEFINED_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([:\[,]\s*)undefined\b").expect("invalid undefined regex"));

/// 结构探针：在JSON树中定位目标节点
pub type Probe = fn(&Value) -> Option<&Value>;

/// 中括号形式的备用标记：`window.X` -> `window["X"]`
pub fn alternate_marker(marker: &str) -> Option<String> {
    marker
        .strip_prefix("window.")
        .map(|inner| format!("window[\"{}\"]", inner))
}

/// 清理结尾多余的逗号
pub fn sanitize_trailing_commas(json: &str) -> String {
    let cleaned = TRAILING_COMMA_OBJECT.replace_all(json, "}");
    TRAILING_COMMA_ARRAY.replace_all(&cleaned, "]").into_owned()
}

/// 定位标记赋值的JSON文本
///
/// 依次尝试 `marker = {...};` 和备用标记形式，返回清理后的JSON文本
pub fn extract_embedded_json(html: &str, marker: &str) -> Option<String> {
    let mut markers = vec![marker.to_string()];
    if let Some(alt) = alternate_marker(marker) {
        markers.push(alt);
    }

    markers.iter().find_map(|m| {
        let pattern = format!(r"(?s){}\s*=\s*(\{{.*?\}});", regex::escape(m));
        let re = Regex::new(&pattern).ok()?;
        re.captures(html)
            .and_then(|c| c.get(1))
            .map(|json| sanitize_trailing_commas(json.as_str()))
    })
}

/// 定位并解析内嵌状态
///
/// `undefined_as_null` 为 true 时先把裸 `undefined` 替换为 `null`
pub fn parse_embedded_state(html: &str, marker: &str, undefined_as_null: bool) -> Option<Value> {
    let mut json = extract_embedded_json(html, marker)?;
    if undefined_as_null {
        json = UNDEFINED_LITERAL.replace_all(&json, "${1}null").into_owned();
    }

    match serde_json::from_str::<Value>(&json) {
        Ok(value) if value.as_object().map_or(false, |o| !o.is_empty()) => Some(value),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("[Embedded] {} JSON解析失败: {}", marker, e);
            None
        }
    }
}

/// 按顺序应用探针，返回第一个命中的节点
pub fn first_match<'a>(tree: &'a Value, probes: &[Probe]) -> Option<&'a Value> {
    probes.iter().find_map(|probe| probe(tree))
}

/// 读取指定路径上的非空字符串
pub fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

/// 依次尝试多个路径，返回第一个非空字符串
pub fn first_str(value: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .find_map(|p| str_at(value, p))
        .map(|s| s.to_string())
}

/// 读取路径上的字符串数组（跳过非字符串和空值）
pub fn str_list_at(value: &Value, pointer: &str) -> Vec<String> {
    value
        .pointer(pointer)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// 读取路径上的非空数组
pub fn non_empty_array<'a>(value: &'a Value, pointer: &str) -> Option<&'a Vec<Value>> {
    value
        .pointer(pointer)
        .and_then(|v| v.as_array())
        .filter(|arr| !arr.is_empty())
}
