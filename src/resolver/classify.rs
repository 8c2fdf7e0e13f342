//! 按域名识别平台

use crate::core::PlatformType;

/// 域名片段 -> 平台，按顺序匹配，先命中者优先
pub const DOMAIN_TABLE: &[(&str, PlatformType)] = &[
    ("douyin.com", PlatformType::Douyin),
    ("iesdouyin.com", PlatformType::Douyin),
    ("amemv.com", PlatformType::Douyin),
    ("kuaishou.com", PlatformType::Kuaishou),
    ("kwaixiaodian.com", PlatformType::Kuaishou),
    ("kwai.com", PlatformType::Kuaishou),
    ("bilibili.com", PlatformType::Bilibili),
    ("b23.tv", PlatformType::Bilibili),
    ("xiaohongshu.com", PlatformType::Xiaohongshu),
    ("xhslink.com", PlatformType::Xiaohongshu),
    ("weibo.com", PlatformType::Weibo),
    ("weibo.cn", PlatformType::Weibo),
    ("toutiao.com", PlatformType::Toutiao),
    ("pipixia.com", PlatformType::Pipixia),
    ("pipix.com", PlatformType::Pipixia),
];

/// 识别链接所属平台，没有命中时返回 [`PlatformType::Unknown`]
pub fn classify(url: &str) -> PlatformType {
    let lower = url.to_lowercase();
    let platform = DOMAIN_TABLE
        .iter()
        .find(|(domain, _)| lower.contains(*domain))
        .map(|(domain, platform)| {
            tracing::debug!("[Resolver] 域名 {} 匹配到平台: {}", domain, platform.id());
            *platform
        })
        .unwrap_or(PlatformType::Unknown);

    if platform == PlatformType::Unknown {
        tracing::info!("[Resolver] 未匹配到任何平台: {}", url);
    }
    platform
}
