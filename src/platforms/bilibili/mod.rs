//! B站平台模块
//!
//! # 解析流程
//!
//! 1. 从链接中提取BV号，短链（b23.tv）先跟随跳转再提取
//! 2. 调用视频信息接口取得 aid / cid
//! 3. 调用播放地址接口取得 durl

pub mod api;

use crate::core::{MediaDescriptor, PlatformType, ResolveError, UNTITLED};
use crate::platforms::http_client::{HttpFetcher, HttpRequest};
use crate::platforms::traits::ResolveStrategy;
use crate::platforms::utils::{api_headers, browser_headers};
use once_cell::sync::Lazy;
use regex::Regex;

static BVID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"BV[a-zA-Z0-9]{10}").expect("invalid bvid regex"));

/// 提取BV号
pub fn extract_bvid(url: &str) -> Option<String> {
    BVID_RE.find(url).map(|m| m.as_str().to_string())
}

/// B站解析策略
pub struct BilibiliStrategy {
    fetcher: HttpFetcher,
}

impl BilibiliStrategy {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self { fetcher }
    }

    async fn resolve_bvid(&self, url: &str, user_agent: &str) -> Result<String, ResolveError> {
        if let Some(bvid) = extract_bvid(url) {
            return Ok(bvid);
        }

        let final_url = self.fetcher.final_url(url, browser_headers(user_agent)).await?;
        tracing::info!("[B站] 短链跳转: {}", final_url);
        extract_bvid(&final_url).ok_or_else(|| ResolveError::extraction(PlatformType::Bilibili, "未找到BV号"))
    }
}

#[async_trait::async_trait]
impl ResolveStrategy for BilibiliStrategy {
    async fn resolve(&self, url: &str) -> Result<MediaDescriptor, ResolveError> {
        tracing::info!("[B站] 开始解析: {}", url);
        let user_agent = self.fetcher.random_user_agent();
        let referer = PlatformType::Bilibili.referer().unwrap_or_default();

        let bvid = self.resolve_bvid(url, &user_agent).await?;
        tracing::info!("[B站] 提取到BV号: {}", bvid);

        let body = self
            .fetcher
            .fetch_json(HttpRequest::get(api::view_url(&bvid)).headers(api_headers(&user_agent, referer)))
            .await?;
        let view: api::ViewData = api::unwrap_data(body)?;
        tracing::debug!("[B站] aid={}, cid={}", view.aid, view.cid);

        let body = self
            .fetcher
            .fetch_json(HttpRequest::get(api::play_url(view.aid, view.cid)).headers(api_headers(&user_agent, referer)))
            .await?;
        let play: api::PlayUrlData = api::unwrap_data(body)?;

        let first = play
            .durl
            .into_iter()
            .next()
            .filter(|d| !d.url.is_empty())
            .ok_or_else(|| ResolveError::extraction(PlatformType::Bilibili, "未找到可用的视频地址"))?;

        let title = if view.title.is_empty() { UNTITLED.to_string() } else { view.title };
        tracing::info!("[B站] 解析成功");
        Ok(MediaDescriptor::video(PlatformType::Bilibili, first.url)
            .with_backup_urls(first.backup_url.unwrap_or_default())
            .with_title(title)
            .with_author(view.owner.name)
            .with_avatar(Some(view.owner.face))
            .with_cover(Some(view.pic))
            .with_source_id(Some(bvid)))
    }

    fn platform_type(&self) -> PlatformType {
        PlatformType::Bilibili
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContentKind, RetryPolicy};
    use crate::platforms::mock::MockTransport;
    use std::sync::Arc;
    use std::time::Duration;

    const VIEW: &str = "https://api.bilibili.com/x/web-interface/view?bvid=BV1GJ411x7h7";
    const PLAY: &str = "https://api.bilibili.com/x/player/playurl?avid=80433022&cid=137649199&qn=80&fnval=0&fourk=1";

    fn strategy(transport: Arc<MockTransport>) -> BilibiliStrategy {
        BilibiliStrategy::new(HttpFetcher::new(
            transport,
            RetryPolicy { attempts: 2, base_delay: Duration::ZERO },
        ))
    }

    fn view_body() -> String {
        r#"{"code":0,"message":"0","data":{"aid":80433022,"cid":137649199,"title":"【官方MV】","pic":"http://i0.hdslb.com/cover.jpg","owner":{"name":"官方","face":"http://i0.hdslb.com/face.jpg"}}}"#.to_string()
    }

    #[test]
    fn test_extract_bvid() {
        assert_eq!(
            extract_bvid("https://www.bilibili.com/video/BV1GJ411x7h7?p=1").as_deref(),
            Some("BV1GJ411x7h7")
        );
        assert!(extract_bvid("https://b23.tv/abcd").is_none());
    }

    #[tokio::test]
    async fn test_resolve_short_link_two_api_calls() {
        let transport = Arc::new(
            MockTransport::new()
                .redirect("https://b23.tv/abcd", "https://www.bilibili.com/video/BV1GJ411x7h7")
                .ok("https://www.bilibili.com/video/BV1GJ411x7h7", "<html></html>")
                .ok(VIEW, &view_body())
                .ok(
                    PLAY,
                    r#"{"code":0,"data":{"durl":[{"url":"https://upos.bilivideo.com/1.mp4","backup_url":["https://upos-bak.bilivideo.com/1.mp4"]}]}}"#,
                ),
        );

        let desc = strategy(transport.clone()).resolve("https://b23.tv/abcd").await.unwrap();
        assert_eq!(desc.content_kind, ContentKind::Video);
        assert_eq!(desc.primary_media_url.as_deref(), Some("https://upos.bilivideo.com/1.mp4"));
        assert_eq!(desc.backup_media_urls, vec!["https://upos-bak.bilivideo.com/1.mp4"]);
        assert_eq!(desc.author_name, "官方");
        assert_eq!(desc.cover_url.as_deref(), Some("http://i0.hdslb.com/cover.jpg"));
        assert_eq!(desc.source_id.as_deref(), Some("BV1GJ411x7h7"));
        assert_eq!(transport.hits(VIEW), 1);
        assert_eq!(transport.hits(PLAY), 1);
    }

    #[tokio::test]
    async fn test_view_api_error_code() {
        let transport = Arc::new(MockTransport::new().ok(VIEW, r#"{"code":-404,"message":"啥都木有"}"#));
        let err = strategy(transport.clone())
            .resolve("https://www.bilibili.com/video/BV1GJ411x7h7")
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::Api { code: -404, .. }));
        assert_eq!(err.status_code(), 404);
        assert_eq!(transport.hits(PLAY), 0);
    }

    #[tokio::test]
    async fn test_empty_durl() {
        let transport = Arc::new(
            MockTransport::new()
                .ok(VIEW, &view_body())
                .ok(PLAY, r#"{"code":0,"data":{"durl":[]}}"#),
        );
        let err = strategy(transport)
            .resolve("https://www.bilibili.com/video/BV1GJ411x7h7")
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::ExtractionFailed { .. }));
    }

    #[tokio::test]
    async fn test_short_link_without_bvid() {
        let transport = Arc::new(MockTransport::new().ok("https://b23.tv/none", "<html></html>"));
        let err = strategy(transport).resolve("https://b23.tv/none").await.unwrap_err();
        assert!(matches!(err, ResolveError::ExtractionFailed { platform: PlatformType::Bilibili, .. }));
    }
}
