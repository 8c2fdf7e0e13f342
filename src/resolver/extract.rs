//! 从用户输入中提取链接

use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("invalid url regex"));

/// 提取第一个 `http(s)://` 链接（到空白处为止），不校验可达性
pub fn extract_url(text: &str) -> Option<&str> {
    let found = URL_RE.find(text).map(|m| m.as_str());
    match found {
        Some(url) => tracing::debug!("[Resolver] 提取到URL: {}", url),
        None => tracing::debug!("[Resolver] 未找到URL"),
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_first_url() {
        assert_eq!(
            extract_url("看看这个 https://v.douyin.com/abc123/ 复制此链接"),
            Some("https://v.douyin.com/abc123/")
        );
        assert_eq!(
            extract_url("a http://b23.tv/x and https://weibo.com/y"),
            Some("http://b23.tv/x")
        );
    }

    #[test]
    fn test_url_runs_to_whitespace() {
        assert_eq!(
            extract_url("https://www.xiaohongshu.com/explore/1?xsec=a&b=c\n下一行"),
            Some("https://www.xiaohongshu.com/explore/1?xsec=a&b=c")
        );
    }

    #[test]
    fn test_no_url() {
        assert_eq!(extract_url("没有链接"), None);
        assert_eq!(extract_url("ftp://example.com/file"), None);
        assert_eq!(extract_url("https://"), None);
    }
}
