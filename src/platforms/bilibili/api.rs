//! B站开放接口
//!
//! - 视频信息：`/x/web-interface/view?bvid=`
//! - 播放地址：`/x/player/playurl?avid=&cid=&qn=80&fnval=0&fourk=1`
//!
//! 接口层面的失败通过响应体中的 `code != 0` 表示，与HTTP状态码无关；
//! 缺少 `code` 同样视为失败

use crate::core::{PlatformType, ResolveError};
use crate::platforms::utils::build_url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

pub const VIEW_API: &str = "https://api.bilibili.com/x/web-interface/view";
pub const PLAY_URL_API: &str = "https://api.bilibili.com/x/player/playurl";

/// 接口通用外层结构
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// UP主信息
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub face: String,
}

/// 视频信息
#[derive(Debug, Clone, Deserialize)]
pub struct ViewData {
    pub aid: i64,
    pub cid: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub pic: String,
    #[serde(default)]
    pub owner: Owner,
}

/// 播放地址分段
#[derive(Debug, Clone, Deserialize)]
pub struct Durl {
    pub url: String,
    #[serde(default)]
    pub backup_url: Option<Vec<String>>,
}

/// 播放地址信息
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayUrlData {
    #[serde(default)]
    pub durl: Vec<Durl>,
}

/// 视频信息接口地址
pub fn view_url(bvid: &str) -> String {
    build_url(VIEW_API, &[("bvid", bvid)])
}

/// 播放地址接口地址
pub fn play_url(aid: i64, cid: i64) -> String {
    let aid = aid.to_string();
    let cid = cid.to_string();
    build_url(
        PLAY_URL_API,
        &[("avid", &aid), ("cid", &cid), ("qn", "80"), ("fnval", "0"), ("fourk", "1")],
    )
}

/// 校验 `code` 并解出 `data`
pub fn unwrap_data<T: DeserializeOwned>(body: Value) -> Result<T, ResolveError> {
    let envelope: ApiEnvelope = serde_json::from_value(body)?;
    match envelope.code {
        Some(0) => {}
        Some(code) => {
            return Err(ResolveError::Api {
                platform: PlatformType::Bilibili,
                code,
                message: envelope.message,
            });
        }
        None => {
            return Err(ResolveError::Api {
                platform: PlatformType::Bilibili,
                code: -1,
                message: "接口未返回code".to_string(),
            });
        }
    }

    let data = envelope
        .data
        .ok_or_else(|| ResolveError::extraction(PlatformType::Bilibili, "接口未返回data"))?;
    Ok(serde_json::from_value(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_play_url_query() {
        assert_eq!(
            play_url(170001, 279786),
            "https://api.bilibili.com/x/player/playurl?avid=170001&cid=279786&qn=80&fnval=0&fourk=1"
        );
        assert_eq!(view_url("BV1xx411c7mD"), "https://api.bilibili.com/x/web-interface/view?bvid=BV1xx411c7mD");
    }

    #[test]
    fn test_unwrap_view_data() {
        let body = json!({"code": 0, "message": "0", "data": {"aid": 1, "cid": 2, "title": "t", "owner": {"name": "up"}}});
        let view: ViewData = unwrap_data(body).unwrap();
        assert_eq!((view.aid, view.cid), (1, 2));
        assert_eq!(view.owner.name, "up");
        assert!(view.pic.is_empty());
    }

    #[test]
    fn test_non_zero_code_is_api_error() {
        let body = json!({"code": -404, "message": "啥都木有", "data": null});
        let err = unwrap_data::<ViewData>(body).unwrap_err();
        match err {
            ResolveError::Api { code, message, .. } => {
                assert_eq!(code, -404);
                assert_eq!(message, "啥都木有");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_code_is_api_error() {
        let body = json!({"data": {"aid": 1, "cid": 2}});
        let err = unwrap_data::<ViewData>(body).unwrap_err();
        assert!(matches!(err, ResolveError::Api { code: -1, .. }));
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_null_backup_url() {
        let body = json!({"code": 0, "data": {"durl": [{"url": "https://upos.test/1.mp4", "backup_url": null}]}});
        let play: PlayUrlData = unwrap_data(body).unwrap();
        assert_eq!(play.durl.len(), 1);
        assert!(play.durl[0].backup_url.is_none());
    }
}
