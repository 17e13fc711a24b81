//! YouTube channel pages and caption tracks.
//!
//! Video metadata lives in the `ytInitialData` JSON embedded in the channel's
//! `/videos` page; the first match of each field is taken to be the newest
//! upload. Caption tracks are linked from the watch page and served as
//! timed-text XML.

use std::future::Future;
use std::pin::Pin;
use std::sync::LazyLock;
use std::time::Duration;

use regex::{Captures, Regex};
use tracing::{debug, info};

use crate::error::MonitorError;

pub const YOUTUBE_URL: &str = "https://www.youtube.com";

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""title":\{"runs":\[\{"text":"(.*?)"\}"#).expect("valid regex"));
static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""videoId":"(.*?)""#).expect("valid regex"));
static PUBLISHED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""publishedTimeText":\{"simpleText":"(.*?)"\}"#).expect("valid regex")
});
static VIEWS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""viewCountText":\{"simpleText":"(.*?)"\}"#).expect("valid regex")
});
static CAPTION_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""captionTracks":\[\{"baseUrl":"(.*?)""#).expect("valid regex")
});
static CAPTION_LANG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]lang=([^&]*)").expect("valid regex"));
/// A `<text>` cue; self-closing cues have no body group.
static CAPTION_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<text\b[^>]*?(?:/>|>(.*?)</text>)").expect("valid regex")
});
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("valid regex"));

/// The newest upload on a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInfo {
    pub title: String,
    pub video_id: String,
    /// Relative publish time as shown by YouTube ("3 hours ago").
    pub published: String,
    /// View count as shown by YouTube ("1,234 views").
    pub views: String,
}

/// Boxed future returned by [`VideoSource`] methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, MonitorError>> + Send + 'a>>;

/// Where the monitor learns about new videos and their captions.
pub trait VideoSource: Send + Sync {
    fn newest_video<'a>(&'a self, channel: &'a str) -> SourceFuture<'a, VideoInfo>;

    /// Full caption text of a video in `language` (e.g. `"en"`).
    fn captions<'a>(&'a self, video_id: &'a str, language: &'a str) -> SourceFuture<'a, String>;

    /// Public link to a video.
    fn video_url(&self, video_id: &str) -> String;
}

/// Scrapes youtube.com over HTTP.
pub struct YouTubeSource {
    client: reqwest::Client,
    base_url: String,
}

impl YouTubeSource {
    pub fn new() -> Result<Self, MonitorError> {
        Self::with_base_url(YOUTUBE_URL)
    }

    /// Use another origin (tests, mirrors).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, MonitorError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .user_agent(concat!("recap-rs/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| MonitorError::Http {
                url: base_url.clone(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, base_url })
    }

    pub fn channel_url(&self, channel: &str) -> String {
        format!("{}/@{channel}", self.base_url)
    }

    async fn fetch(&self, url: &str) -> Result<String, MonitorError> {
        let http_error = |message: String| MonitorError::Http {
            url: url.to_string(),
            message,
        };
        debug!("GET {url}");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| http_error(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(http_error(format!("HTTP {status}")));
        }
        resp.text().await.map_err(|e| http_error(e.to_string()))
    }

    async fn fetch_newest_video(&self, channel: &str) -> Result<VideoInfo, MonitorError> {
        let url = format!("{}/videos", self.channel_url(channel));
        let html = self.fetch(&url).await?;
        parse_newest_video(&html, &url)
    }

    async fn fetch_captions(&self, video_id: &str, language: &str) -> Result<String, MonitorError> {
        let watch_url = self.video_url(video_id);
        let html = self.fetch(&watch_url).await?;
        let caption_url = parse_caption_url(&html, &watch_url)?;

        let found = caption_language(&caption_url).unwrap_or_default();
        if found != language {
            return Err(MonitorError::CaptionLanguage {
                expected: language.to_string(),
                found: found.to_string(),
            });
        }

        let xml = self.fetch(&caption_url).await?;
        let captions = parse_captions(&xml);
        info!(
            "Retrieved {found} captions for video {video_id} ({} words)",
            captions.split_whitespace().count()
        );
        Ok(captions)
    }
}

impl VideoSource for YouTubeSource {
    fn newest_video<'a>(&'a self, channel: &'a str) -> SourceFuture<'a, VideoInfo> {
        Box::pin(self.fetch_newest_video(channel))
    }

    fn captions<'a>(&'a self, video_id: &'a str, language: &'a str) -> SourceFuture<'a, String> {
        Box::pin(self.fetch_captions(video_id, language))
    }

    fn video_url(&self, video_id: &str) -> String {
        format!("{}/watch?v={video_id}", self.base_url)
    }
}

fn first_capture<'h>(
    re: &Regex,
    haystack: &'h str,
    what: &'static str,
    source_url: &str,
) -> Result<&'h str, MonitorError> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| MonitorError::Extraction {
            what,
            source_url: source_url.to_string(),
        })
}

/// Undo JSON string escaping (`\"`, `\u0026`) in a scraped value.
fn unescape_json(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{raw}\"")).unwrap_or_else(|_| raw.to_string())
}

/// Extract the newest video from a channel's `/videos` page.
pub fn parse_newest_video(html: &str, source_url: &str) -> Result<VideoInfo, MonitorError> {
    Ok(VideoInfo {
        title: unescape_json(first_capture(&TITLE_RE, html, "video title", source_url)?),
        video_id: first_capture(&VIDEO_ID_RE, html, "video id", source_url)?.to_string(),
        published: unescape_json(first_capture(&PUBLISHED_RE, html, "publish time", source_url)?),
        views: unescape_json(first_capture(&VIEWS_RE, html, "view count", source_url)?),
    })
}

/// Extract the first caption track URL from a watch page.
pub fn parse_caption_url(html: &str, source_url: &str) -> Result<String, MonitorError> {
    let raw = first_capture(&CAPTION_URL_RE, html, "caption track", source_url)?;
    Ok(raw.replace("\\u0026", "&"))
}

/// The `lang` query parameter of a caption track URL.
pub fn caption_language(caption_url: &str) -> Option<&str> {
    CAPTION_LANG_RE
        .captures(caption_url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Join the `<text>` bodies of a timed-text document, one trailing space each.
///
/// Bodies are entity-decoded twice: once for the XML layer and once for the
/// HTML escaping YouTube applies inside it (`&amp;#39;` becomes `'`).
pub fn parse_captions(xml: &str) -> String {
    let mut captions = String::new();
    for cap in CAPTION_TEXT_RE.captures_iter(xml) {
        let body = cap.get(1).map_or("", |m| m.as_str());
        captions.push_str(&decode_entities(&decode_entities(body)));
        captions.push(' ');
    }
    captions
}

/// Decode named and numeric character references. Unknown names are kept.
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
