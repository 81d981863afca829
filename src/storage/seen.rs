use md5::{Digest, Md5};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::feed::FeedEntry;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Seen-entry record I/O failed for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Seen-entry record '{path}' is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize feed entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Whether the current entry was already republished by an earlier run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// No record exists for this feed URL yet.
    FirstRun,
    /// The recorded entry has a different link.
    Changed { previous_link: String },
    /// The recorded entry has the same link; nothing to do.
    Unchanged,
}

/// Flat-file record of the last entry seen per feed URL.
///
/// Each feed URL maps to `<dir>/<md5(url)>.json`, holding the JSON form of
/// the last [`FeedEntry`] seen for it. Records are overwritten, never deleted.
#[derive(Debug, Clone)]
pub struct SeenStore {
    dir: PathBuf,
}

impl SeenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lower-case hex MD5 of the feed URL bytes.
    pub fn key(feed_url: &str) -> String {
        format!("{:x}", Md5::digest(feed_url.as_bytes()))
    }

    pub fn record_path(&self, feed_url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", Self::key(feed_url)))
    }

    /// Load the last entry recorded for `feed_url`, if any.
    pub fn load(&self, feed_url: &str) -> Result<Option<FeedEntry>, StoreError> {
        let path = self.record_path(feed_url);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { path, source })
    }

    /// Compare `entry` against the stored record by link.
    pub fn check(&self, feed_url: &str, entry: &FeedEntry) -> Result<Freshness, StoreError> {
        let freshness = match self.load(feed_url)? {
            None => Freshness::FirstRun,
            Some(previous) if previous.link == entry.link => Freshness::Unchanged,
            Some(previous) => Freshness::Changed {
                previous_link: previous.link,
            },
        };
        Ok(freshness)
    }

    /// Overwrite the record for `feed_url` with `entry`.
    ///
    /// Writes to a temporary sibling first and renames it into place, so a
    /// crash never leaves a truncated record behind.
    pub fn commit(&self, feed_url: &str, entry: &FeedEntry) -> Result<PathBuf, StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.record_path(feed_url);
        let json = serde_json::to_vec(entry)?;
        write_atomic(&path, &json).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), link = %entry.link, "Recorded seen entry");
        Ok(path)
    }
}

fn write_atomic(dst: &Path, content: &[u8]) -> std::io::Result<()> {
    let temp_path = dst.with_extension(format!("json.tmp.{}", std::process::id()));

    let result = (|| {
        let mut temp_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        temp_file.write_all(content)?;
        temp_file.sync_all()?;
        drop(temp_file);

        // On Windows, rename fails if destination exists
        #[cfg(windows)]
        if dst.exists() {
            std::fs::remove_file(dst)?;
        }

        std::fs::rename(&temp_path, dst)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}
