//! File-locked rate limiter for install/remove operations.
//!
//! Buckets are plain JSON files under the state root, one per bucket name,
//! holding a sliding window of timestamps. Profile-driven installs bypass
//! the limiter entirely — a profile legitimately issues many installs in
//! one call and isn't the abuse case this guards against.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize};
use sindri_core::error::Error as CoreError;
use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_OPERATIONS: u32 = 10;
pub const DEFAULT_WINDOW_SECS: i64 = 5 * 60;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Bucket {
    timestamps: Vec<DateTime<Utc>>,
}

pub struct RateLimiter {
    state_dir: PathBuf,
    max_operations: u32,
    window: ChronoDuration,
}

impl RateLimiter {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            max_operations: DEFAULT_MAX_OPERATIONS,
            window: ChronoDuration::seconds(DEFAULT_WINDOW_SECS),
        }
    }

    pub fn with_limits(mut self, max_operations: u32, window: ChronoDuration) -> Self {
        self.max_operations = max_operations;
        self.window = window;
        self
    }

    /// Record one operation in `bucket` and fail with `RateLimited` if this
    /// pushes the sliding window over the configured limit. Exempt callers
    /// (profile-driven installs) should not call this at all.
    pub fn check_and_record(&self, bucket: &str) -> Result<(), CoreError> {
        match self.try_check_and_record(bucket) {
            Ok(inner) => inner,
            Err(e) => Err(CoreError::InvalidConfig {
                message: format!("rate limiter error for bucket {}: {}", bucket, e),
            }),
        }
    }

    fn try_check_and_record(&self, bucket: &str) -> Result<Result<(), CoreError>> {
        fs::create_dir_all(&self.state_dir).context("creating rate limiter state directory")?;
        let path = self.bucket_path(bucket);

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .context("opening rate limiter bucket file")?;
        file.lock_exclusive().context("locking rate limiter bucket")?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .context("reading rate limiter bucket")?;
        let mut state: Bucket = if contents.trim().is_empty() {
            Bucket::default()
        } else {
            serde_json::from_str(&contents).unwrap_or_default()
        };

        let now = Utc::now();
        let cutoff = now - self.window;
        state.timestamps.retain(|ts| *ts > cutoff);

        let result = if state.timestamps.len() as u32 >= self.max_operations {
            Err(CoreError::RateLimited {
                bucket: bucket.to_string(),
                count: state.timestamps.len() as u32,
            })
        } else {
            state.timestamps.push(now);
            Ok(())
        };

        let serialized = serde_json::to_string(&state)?;
        file.set_len(0).context("truncating rate limiter bucket")?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(serialized.as_bytes())?;
        file.sync_all().context("syncing rate limiter bucket")?;

        Ok(result)
    }

    fn bucket_path(&self, bucket: &str) -> PathBuf {
        self.state_dir.join(format!("ratelimit-{}.json", bucket))
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }
}
