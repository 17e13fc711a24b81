//! Last-seen video per channel, persisted as JSON.
//!
//! The set of watched channels is the set of keys in the file; add a channel
//! with `recap watch --add <channel>` or by editing the file. A new upload is
//! detected by comparing titles, so a renamed video is reported again.
//!
//! Older deployments kept this table as `latest_videos.csv` (channel in the
//! first column, plus a `title` column). [`LastSeenStore::import_csv`] reads
//! that file; `recap watch --import-csv <path>` migrates it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// The most recent video seen on a channel.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct LastSeen {
    /// Title of the newest video; empty until the first check.
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct StateFile {
    #[serde(default)]
    channels: BTreeMap<String, LastSeen>,
}

/// File-backed map from channel handle to [`LastSeen`].
#[derive(Debug)]
pub struct LastSeenStore {
    path: PathBuf,
    state: StateFile,
}

impl LastSeenStore {
    /// Load the store at `path`. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, MonitorError> {
        let path = path.into();
        let state = if path.exists() {
            let json = std::fs::read_to_string(&path)?;
            serde_json::from_str(&json).map_err(|e| MonitorError::State {
                path: path.display().to_string(),
                message: format!("failed to parse: {e}"),
            })?
        } else {
            StateFile::default()
        };
        Ok(Self { path, state })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Watched channels in name order.
    pub fn channels(&self) -> Vec<String> {
        self.state.channels.keys().cloned().collect()
    }

    pub fn get(&self, channel: &str) -> Option<&LastSeen> {
        self.state.channels.get(channel)
    }

    /// Title of the newest video seen on `channel`, if any.
    pub fn last_title(&self, channel: &str) -> Option<&str> {
        self.get(channel)
            .map(|seen| seen.title.as_str())
            .filter(|title| !title.is_empty())
    }

    /// Start watching `channel`. Returns `false` if it was already watched.
    pub fn add_channel(&mut self, channel: impl Into<String>) -> bool {
        let channel = channel.into();
        if self.state.channels.contains_key(&channel) {
            return false;
        }
        self.state.channels.insert(channel, LastSeen::default());
        true
    }

    /// Record `title` as the newest video on `channel`.
    pub fn record(&mut self, channel: &str, title: &str, video_id: &str) {
        self.state.channels.insert(
            channel.to_string(),
            LastSeen {
                title: title.to_string(),
                video_id: Some(video_id.to_string()),
                updated_at: Some(Utc::now()),
            },
        );
    }

    /// Merge a legacy CSV table into the store, replacing entries for the
    /// same channels. Returns the number of channels read.
    pub fn import_csv(&mut self, path: impl AsRef<Path>) -> Result<usize, MonitorError> {
        let path = path.as_ref();
        let state_error = |message: String| MonitorError::State {
            path: path.display().to_string(),
            message,
        };
        let csv_error = |e: csv::Error| state_error(format!("failed to read CSV: {e}"));

        let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
        let title_column = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .position(|h| h.trim() == "title")
            .ok_or_else(|| state_error("no `title` column".to_string()))?;

        let mut imported = 0;
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            let Some(channel) = record.get(0).map(str::trim).filter(|c| !c.is_empty()) else {
                continue;
            };
            let title = record.get(title_column).unwrap_or_default().trim();
            self.state.channels.insert(
                channel.to_string(),
                LastSeen {
                    title: title.to_string(),
                    ..LastSeen::default()
                },
            );
            imported += 1;
        }
        Ok(imported)
    }

    /// Atomic write: serialize to a temp file, then rename into place.
    pub fn save(&self) -> Result<(), MonitorError> {
        let state_error = |message: String| MonitorError::State {
            path: self.path.display().to_string(),
            message,
        };
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.state)
            .map_err(|e| state_error(format!("failed to serialize: {e}")))?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}
