//! Channel monitoring: detect new uploads, announce them, and post a summary
//! of their captions.
//!
//! One pass ([`Monitor::run_once`]) walks every channel in the
//! [`LastSeenStore`]. For a channel whose newest title differs from the stored
//! one it:
//!
//! 1. records the new title and saves the store,
//! 2. sends an announcement with the video link,
//! 3. fetches the captions and writes them to `{captions_dir}/{channel}-{video_id}.txt`,
//! 4. summarizes the captions and sends the summary.
//!
//! A failure on one channel is logged and reported; the remaining channels
//! are still checked.

pub mod state;
pub mod telegram;
pub mod youtube;

use std::path::PathBuf;

use tracing::{error, info};

pub use state::{LastSeen, LastSeenStore};
pub use telegram::{Notifier, NotifyFuture, TELEGRAM_API_URL, TelegramNotifier};
pub use youtube::{SourceFuture, VideoInfo, VideoSource, YOUTUBE_URL, YouTubeSource};

use crate::api::retry::{RetryConfig, retry_transient};
use crate::error::MonitorError;
use crate::summarize::RecursiveSummarizer;

/// What a monitoring pass summarizes with and where it writes.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub model: String,
    pub context_tokens: usize,
    /// Caption language code the video must have (e.g. `"en"`).
    pub caption_language: String,
    pub captions_dir: PathBuf,
    /// Retry policy around the whole summarization of one video.
    pub retry: RetryConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            model: "mistral-nemo".into(),
            context_tokens: 16_000,
            caption_language: "en".into(),
            captions_dir: PathBuf::from("data/captions"),
            retry: RetryConfig::with_retries(2),
        }
    }
}

/// A newly detected upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVideo {
    pub channel: String,
    pub title: String,
    pub url: String,
}

/// Outcome of one monitoring pass.
#[derive(Debug, Default)]
pub struct MonitorReport {
    /// Channels whose newest video was looked up successfully.
    pub checked: usize,
    pub new_videos: Vec<NewVideo>,
    /// Channels that failed, with the error message.
    pub failed: Vec<(String, String)>,
}

/// Announcement line for a new upload.
pub fn announcement(channel: &str, video: &VideoInfo, url: &str) -> String {
    format!(
        "[YouTube - {channel}] {} ({}, {}) - {url}",
        video.title, video.published, video.views
    )
}

/// Ties a video source, the last-seen store, the summarizer and a notifier
/// together.
pub struct Monitor<'a> {
    source: &'a dyn VideoSource,
    notifier: &'a dyn Notifier,
    summarizer: RecursiveSummarizer<'a>,
    store: LastSeenStore,
    config: MonitorConfig,
}

impl<'a> Monitor<'a> {
    pub fn new(
        source: &'a dyn VideoSource,
        notifier: &'a dyn Notifier,
        summarizer: RecursiveSummarizer<'a>,
        store: LastSeenStore,
        config: MonitorConfig,
    ) -> Self {
        Self {
            source,
            notifier,
            summarizer,
            store,
            config,
        }
    }

    pub fn store(&self) -> &LastSeenStore {
        &self.store
    }

    /// Check every watched channel once.
    pub async fn run_once(&mut self) -> MonitorReport {
        let mut report = MonitorReport::default();
        for channel in self.store.channels() {
            match self.check_channel(&channel, &mut report).await {
                Ok(Some(video)) => report.new_videos.push(video),
                Ok(None) => {}
                Err(e) => {
                    error!("Channel @{channel} failed: {e}");
                    report.failed.push((channel, e.to_string()));
                }
            }
        }
        info!(
            "Checked {} channel(s): {} new, {} failed",
            report.checked,
            report.new_videos.len(),
            report.failed.len()
        );
        report
    }

    async fn check_channel(
        &mut self,
        channel: &str,
        report: &mut MonitorReport,
    ) -> Result<Option<NewVideo>, MonitorError> {
        let video = self.source.newest_video(channel).await?;
        report.checked += 1;
        info!("Newest video from @{channel}: {}", video.title);

        if self.store.last_title(channel) == Some(video.title.as_str()) {
            info!("No new videos from @{channel}.");
            return Ok(None);
        }

        info!("New video from @{channel}!");
        self.store.record(channel, &video.title, &video.video_id);
        self.store.save()?;
        info!("Updated {}", self.store.path().display());

        let url = self.source.video_url(&video.video_id);
        self.notifier
            .send(&announcement(channel, &video, &url))
            .await?;

        let captions = self
            .source
            .captions(&video.video_id, &self.config.caption_language)
            .await?;
        std::fs::create_dir_all(&self.config.captions_dir)?;
        let captions_path = self
            .config
            .captions_dir
            .join(format!("{channel}-{}.txt", video.video_id));
        std::fs::write(&captions_path, &captions)?;
        info!("Saved captions to {}", captions_path.display());

        let summary = retry_transient(&self.config.retry, || {
            self.summarizer
                .summarize(&captions, &self.config.model, self.config.context_tokens)
        })
        .await?;
        self.notifier.send(&summary).await?;

        Ok(Some(NewVideo {
            channel: channel.to_string(),
            title: video.title,
            url,
        }))
    }
}
