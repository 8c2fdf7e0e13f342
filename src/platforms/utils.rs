//! 平台解析工具函数
//!
//! 提供请求头构造、转义还原、正则提取、URL拼接等工具方法
//!
//! # 主要功能
//!
//! - 浏览器风格请求头
//! - 还原 `/`、`\/` 等转义的URL
//! - 还原正则抓取到的文本（JSON转义 + HTML实体）
//! - 正则首个/全部捕获
//! - 带查询参数的URL拼接

use regex::Regex;

/// 页面请求的 Accept
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// 抓取HTML页面使用的请求头
///
/// # 参数
///
/// * `user_agent` - 本次请求使用的UA
pub fn browser_headers(user_agent: &str) -> Vec<(String, String)> {
    vec![
        ("User-Agent".to_string(), user_agent.to_string()),
        ("Accept".to_string(), HTML_ACCEPT.to_string()),
        ("Accept-Language".to_string(), "zh-CN,zh;q=0.9,en;q=0.8".to_string()),
        ("Connection".to_string(), "keep-alive".to_string()),
        ("Upgrade-Insecure-Requests".to_string(), "1".to_string()),
    ]
}

/// 调用JSON接口使用的请求头
pub fn api_headers(user_agent: &str, referer: &str) -> Vec<(String, String)> {
    vec![
        ("User-Agent".to_string(), user_agent.to_string()),
        ("Accept".to_string(), "application/json, text/plain, */*".to_string()),
        ("Referer".to_string(), referer.to_string()),
    ]
}

/// 还原页面中被转义的URL
pub fn unescape_url(raw: &str) -> String {
    raw.replace("\\u002F", "/")
        .replace("\\u002f", "/")
        .replace("\\u0026", "&")
        .replace("\\/", "/")
}

/// 还原正则抓取到的文本
///
/// 先按JSON字符串解码（处理 `\uXXXX` 等），失败则保留原文，再解码HTML实体
pub fn decode_text(raw: &str) -> String {
    let decoded = serde_json::from_str::<String>(&format!("\"{}\"", raw))
        .unwrap_or_else(|_| raw.to_string());
    html_escape::decode_html_entities(&decoded).to_string()
}

/// 取正则第一个匹配的第1个捕获组
pub fn capture_first(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// 取正则所有匹配的第1个捕获组（保持顺序）
pub fn capture_all(re: &Regex, haystack: &str) -> Vec<String> {
    re.captures_iter(haystack)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// 去重并保持首次出现顺序
pub fn dedup_preserve_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| !item.is_empty() && seen.insert(item.clone()))
        .collect()
}

/// 构建带参数的URL
///
/// # 参数
///
/// * `base_url` - 基础URL（不含查询串）
/// * `params` - 查询参数，值会被URL编码
pub fn build_url(base_url: &str, params: &[(&str, &str)]) -> String {
    let mut url = base_url.to_string();

    if !params.is_empty() {
        url.push('?');
        let param_list: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();
        url.push_str(&param_list.join("&"));
    }

    url
}

/// 截断长文本用于日志
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_url() {
        assert_eq!(
            unescape_url(r"https:\u002F\u002Faweme.snssdk.com\u002Fplay?a=1\u0026b=2"),
            "https://aweme.snssdk.com/play?a=1&b=2"
        );
        assert_eq!(unescape_url(r"https:\/\/v.kwai.com\/x.mp4"), "https://v.kwai.com/x.mp4");
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text(r"\u4f60\u597d world"), "你好 world");
        assert_eq!(decode_text("Tom &amp; Jerry"), "Tom & Jerry");
        // 非法转义保留原文
        assert_eq!(decode_text(r"bad \x escape"), r"bad \x escape");
    }

    #[test]
    fn test_build_url() {
        let url = build_url("https://api.example.com/weibo", &[("url", "https://weibo.com/1?a=b&c=d")]);
        assert_eq!(
            url,
            "https://api.example.com/weibo?url=https%3A%2F%2Fweibo.com%2F1%3Fa%3Db%26c%3Dd"
        );
        assert_eq!(build_url("https://a.test/x", &[]), "https://a.test/x");
    }

    #[test]
    fn test_capture_helpers() {
        let re = Regex::new(r#""u":"([^"]+)""#).unwrap();
        let text = r#"{"u":"a"},{"u":"b"},{"u":"a"}"#;
        assert_eq!(capture_first(&re, text).as_deref(), Some("a"));
        assert_eq!(capture_all(&re, text), vec!["a", "b", "a"]);
        assert_eq!(dedup_preserve_order(capture_all(&re, text)), vec!["a", "b"]);
    }

    #[test]
    fn test_browser_headers_carry_user_agent() {
        let headers = browser_headers("ua-x");
        assert!(headers.iter().any(|(k, v)| k == "User-Agent" && v == "ua-x"));
    }
}
