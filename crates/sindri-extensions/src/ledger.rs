use crate::events::{EventEnvelope, ExtensionEvent};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize};
use sindri_core::types::ExtensionState;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

/// Extension status derived from ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionStatus {
    pub extension_name: String,
    pub current_state: ExtensionState,
    pub last_event_time: DateTime<Utc>,
    pub last_event_id: String,
    pub version: Option<String>,
}

/// Filter criteria for querying events from the ledger
#[derive(Debug, Default)]
pub struct EventFilter {
    /// Filter by extension name
    pub extension_name: Option<String>,
    /// Filter by event type names (e.g., "install_started", "install_completed")
    pub event_types: Option<Vec<String>>,
    /// Only events after this timestamp
    pub since: Option<DateTime<Utc>>,
    /// Only events before this timestamp
    pub until: Option<DateTime<Utc>>,
    /// Maximum number of events to return
    pub limit: Option<usize>,
    /// If true, return the most recent N events (tail mode)
    pub reverse: bool,
}

/// Default number of events shown in tail mode
pub const DEFAULT_LOG_TAIL_LINES: usize = 25;

/// Default poll interval for follow mode (seconds)
pub const DEFAULT_FOLLOW_POLL_SECS: u64 = 1;

/// Default auto-compaction interval (every N operations)
const AUTO_COMPACT_INTERVAL: usize = 100;

/// Default retention period in days for auto-compaction
const AUTO_COMPACT_RETENTION_DAYS: i64 = 90;

/// Status ledger implementation
pub struct StatusLedger {
    ledger_path: PathBuf,
}

impl StatusLedger {
    /// Create/load ledger from default location (~/.sindri/status_ledger.jsonl)
    pub fn load_default() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Failed to get home directory")?;
        let sindri_dir = home_dir.join(".sindri");
        fs::create_dir_all(&sindri_dir).context("Failed to create .sindri directory")?;

        let ledger_path = sindri_dir.join("status_ledger.jsonl");
        Ok(Self { ledger_path })
    }

    /// Create ledger from custom path
    pub fn new(ledger_path: PathBuf) -> Self {
        Self { ledger_path }
    }

    /// Append event to ledger (atomic, file-locked) with auto-compaction
    pub fn append(&self, event: EventEnvelope) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.ledger_path.parent() {
            fs::create_dir_all(parent).context("Failed to create ledger parent directory")?;
        }

        {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.ledger_path)
                .context("Failed to open ledger file")?;

            // Acquire exclusive lock (released on drop)
            file.lock_exclusive()
                .context("Failed to acquire exclusive lock on ledger")?;

            let json_line = serde_json::to_string(&event).context("Failed to serialize event")?;
            writeln!(file, "{}", json_line).context("Failed to write event to ledger")?;
            file.sync_all().context("Failed to sync ledger file")?; // Ensure durability

            // File lock is released here when `file` is dropped
        }

        // After successful append, check if auto-compaction is needed.
        // This runs outside the file lock so compaction can acquire its own locks.
        self.maybe_auto_compact();

        Ok(())
    }

    /// Auto-compact if total events reaches the compaction interval threshold.
    /// Failures are logged but do not propagate -- auto-compaction is best-effort.
    fn maybe_auto_compact(&self) {
        let event_count = match self.count_events() {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("Auto-compaction skipped: failed to count events: {}", e);
                return;
            }
        };

        if event_count > 0 && event_count % AUTO_COMPACT_INTERVAL == 0 {
            tracing::debug!("Auto-compacting ledger ({} events)", event_count);
            match self.compact(AUTO_COMPACT_RETENTION_DAYS) {
                Ok(removed) => {
                    if removed > 0 {
                        tracing::info!("Auto-compacted ledger: removed {} old events", removed);
                    }
                }
                Err(e) => {
                    tracing::warn!("Auto-compaction failed: {}", e);
                }
            }
        }
    }

    /// Count total non-empty lines in the ledger file (fast, no JSON parsing).
    fn count_events(&self) -> Result<usize> {
        if !self.ledger_path.exists() {
            return Ok(0);
        }

        let file =
            fs::File::open(&self.ledger_path).context("Failed to open ledger file for counting")?;
        let reader = BufReader::new(file);
        let count = reader
            .lines()
            .filter(|l| l.as_ref().map(|s| !s.trim().is_empty()).unwrap_or(false))
            .count();
        Ok(count)
    }

    /// Get latest status for all extensions (aggregate query)
    pub fn get_all_latest_status(&self) -> Result<HashMap<String, ExtensionStatus>> {
        if !self.ledger_path.exists() {
            return Ok(HashMap::new());
        }

        let file = fs::File::open(&self.ledger_path).context("Failed to open ledger file")?;
        let reader = BufReader::new(file);

        let mut status_map: HashMap<String, ExtensionStatus> = HashMap::new();

        for line in reader.lines() {
            let line = line.context("Failed to read line from ledger")?;
            if line.trim().is_empty() {
                continue;
            }

            let envelope: EventEnvelope =
                serde_json::from_str(&line).context("Failed to deserialize event from ledger")?;

            // Extract version from event
            let version = Self::extract_version_from_event(&envelope.event);

            // Update or insert status for this extension
            status_map
                .entry(envelope.extension_name.clone())
                .and_modify(|status| {
                    // Update only if this event is newer
                    if envelope.timestamp > status.last_event_time {
                        status.current_state = envelope.state_after;
                        status.last_event_time = envelope.timestamp;
                        status.last_event_id = envelope.event_id.clone();
                        if let Some(v) = &version {
                            status.version = Some(v.clone());
                        }
                    }
                })
                .or_insert_with(|| ExtensionStatus {
                    extension_name: envelope.extension_name.clone(),
                    current_state: envelope.state_after,
                    last_event_time: envelope.timestamp,
                    last_event_id: envelope.event_id.clone(),
                    version,
                });
        }

        Ok(status_map)
    }

    /// Get event history for specific extension (chronological)
    pub fn get_extension_history(
        &self,
        name: &str,
        limit: Option<usize>,
    ) -> Result<Vec<EventEnvelope>> {
        if !self.ledger_path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.ledger_path).context("Failed to open ledger file")?;
        let reader = BufReader::new(file);

        let mut events = Vec::new();

        for line in reader.lines() {
            let line = line.context("Failed to read line from ledger")?;
            if line.trim().is_empty() {
                continue;
            }

            let envelope: EventEnvelope =
                serde_json::from_str(&line).context("Failed to deserialize event from ledger")?;

            if envelope.extension_name == name {
                events.push(envelope);
            }
        }

        // Apply limit if specified (most recent events)
        if let Some(limit_val) = limit {
            if events.len() > limit_val {
                events = events.split_off(events.len() - limit_val);
            }
        }

        Ok(events)
    }

    /// Get events since timestamp
    pub fn get_events_since(&self, since: DateTime<Utc>) -> Result<Vec<EventEnvelope>> {
        if !self.ledger_path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.ledger_path).context("Failed to open ledger file")?;
        let reader = BufReader::new(file);

        let mut events = Vec::new();

        for line in reader.lines() {
            let line = line.context("Failed to read line from ledger")?;
            if line.trim().is_empty() {
                continue;
            }

            let envelope: EventEnvelope =
                serde_json::from_str(&line).context("Failed to deserialize event from ledger")?;

            if envelope.timestamp >= since {
                events.push(envelope);
            }
        }

        Ok(events)
    }

    /// Compact ledger (prune old events, keep retention period history)
    pub fn compact(&self, retention_days: i64) -> Result<usize> {
        if !self.ledger_path.exists() {
            return Ok(0);
        }

        let cutoff_time = Utc::now() - Duration::days(retention_days);
        let temp_path = self.ledger_path.with_extension("jsonl.tmp");

        let file = fs::File::open(&self.ledger_path).context("Failed to open ledger file")?;
        let reader = BufReader::new(file);

        let mut temp_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .context("Failed to create temp ledger file")?;

        let mut removed_count = 0;

        // Keep track of latest event per extension (always keep these)
        let latest_events = self.get_all_latest_status()?;
        let latest_event_ids: HashMap<String, String> = latest_events
            .into_iter()
            .map(|(name, status)| (name, status.last_event_id))
            .collect();

        for line in reader.lines() {
            let line = line.context("Failed to read line from ledger")?;
            if line.trim().is_empty() {
                continue;
            }

            let envelope: EventEnvelope =
                serde_json::from_str(&line).context("Failed to deserialize event from ledger")?;

            // Keep event if:
            // 1. It's within retention period, OR
            // 2. It's the latest event for its extension
            let is_latest = latest_event_ids
                .get(&envelope.extension_name)
                .map(|id| id == &envelope.event_id)
                .unwrap_or(false);

            if envelope.timestamp >= cutoff_time || is_latest {
                writeln!(temp_file, "{}", line).context("Failed to write to temp ledger")?;
            } else {
                removed_count += 1;
            }
        }

        temp_file.sync_all().context("Failed to sync temp ledger")?;
        drop(temp_file);

        // Replace original with compacted version
        fs::rename(&temp_path, &self.ledger_path)
            .context("Failed to replace ledger with compacted version")?;

        Ok(removed_count)
    }

    /// Get ledger statistics
    pub fn get_stats(&self) -> Result<LedgerStats> {
        if !self.ledger_path.exists() {
            return Ok(LedgerStats::default());
        }

        let file = fs::File::open(&self.ledger_path).context("Failed to open ledger file")?;
        let reader = BufReader::new(file);

        let mut total_events = 0;
        let mut oldest_timestamp: Option<DateTime<Utc>> = None;
        let mut newest_timestamp: Option<DateTime<Utc>> = None;
        let mut event_type_counts: HashMap<String, usize> = HashMap::new();

        for line in reader.lines() {
            let line = line.context("Failed to read line from ledger")?;
            if line.trim().is_empty() {
                continue;
            }

            let envelope: EventEnvelope =
                serde_json::from_str(&line).context("Failed to deserialize event from ledger")?;

            total_events += 1;

            // Track oldest/newest timestamps
            if oldest_timestamp.is_none_or(|t| envelope.timestamp < t) {
                oldest_timestamp = Some(envelope.timestamp);
            }
            if newest_timestamp.is_none_or(|t| envelope.timestamp > t) {
                newest_timestamp = Some(envelope.timestamp);
            }

            // Count event types
            let event_type = Self::get_event_type_name(&envelope.event);
            *event_type_counts.entry(event_type).or_insert(0) += 1;
        }

        let file_size = fs::metadata(&self.ledger_path)
            .context("Failed to get ledger file metadata")?
            .len();

        Ok(LedgerStats {
            total_events,
            file_size_bytes: file_size,
            oldest_timestamp,
            newest_timestamp,
            event_type_counts,
        })
    }

    /// Query events from the ledger with filtering
    pub fn query_events(&self, filter: EventFilter) -> Result<Vec<EventEnvelope>> {
        if !self.ledger_path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.ledger_path).context("Failed to open ledger file")?;
        let reader = BufReader::new(file);

        let mut events = Vec::new();

        for line in reader.lines() {
            let line = line.context("Failed to read line from ledger")?;
            if line.trim().is_empty() {
                continue;
            }

            let envelope: EventEnvelope =
                serde_json::from_str(&line).context("Failed to deserialize event from ledger")?;

            // Apply extension name filter
            if let Some(ref name) = filter.extension_name {
                if envelope.extension_name != *name {
                    continue;
                }
            }

            // Apply event type filter
            if let Some(ref types) = filter.event_types {
                let event_type = Self::get_event_type_name(&envelope.event);
                if !types.contains(&event_type) {
                    continue;
                }
            }

            // Apply since filter
            if let Some(since) = filter.since {
                if envelope.timestamp < since {
                    continue;
                }
            }

            // Apply until filter
            if let Some(until) = filter.until {
                if envelope.timestamp > until {
                    continue;
                }
            }

            events.push(envelope);
        }

        // Handle tail mode: reverse + limit gives last N events in chronological order
        if filter.reverse {
            if let Some(limit) = filter.limit {
                if events.len() > limit {
                    events = events.split_off(events.len() - limit);
                }
            }
        } else if let Some(limit) = filter.limit {
            events.truncate(limit);
        }

        Ok(events)
    }

    /// Extract version from event payload
    fn extract_version_from_event(event: &ExtensionEvent) -> Option<String> {
        match event {
            ExtensionEvent::InstallStarted { version, .. }
            | ExtensionEvent::InstallCompleted { version, .. }
            | ExtensionEvent::InstallFailed { version, .. }
            | ExtensionEvent::RemoveStarted { version, .. }
            | ExtensionEvent::RemoveCompleted { version, .. }
            | ExtensionEvent::RemoveFailed { version, .. }
            | ExtensionEvent::ValidationSucceeded { version, .. }
            | ExtensionEvent::ValidationFailed { version, .. } => Some(version.clone()),
            ExtensionEvent::UpgradeCompleted { to_version, .. }
            | ExtensionEvent::UpgradeFailed { to_version, .. } => Some(to_version.clone()),
            ExtensionEvent::UpgradeStarted { to_version, .. } => Some(to_version.clone()),
            ExtensionEvent::OutdatedDetected { latest_version, .. } => Some(latest_version.clone()),
        }
    }

    /// Get event type name for statistics and display
    pub fn get_event_type_name(event: &ExtensionEvent) -> String {
        match event {
            ExtensionEvent::InstallStarted { .. } => "install_started",
            ExtensionEvent::InstallCompleted { .. } => "install_completed",
            ExtensionEvent::InstallFailed { .. } => "install_failed",
            ExtensionEvent::UpgradeStarted { .. } => "upgrade_started",
            ExtensionEvent::UpgradeCompleted { .. } => "upgrade_completed",
            ExtensionEvent::UpgradeFailed { .. } => "upgrade_failed",
            ExtensionEvent::RemoveStarted { .. } => "remove_started",
            ExtensionEvent::RemoveCompleted { .. } => "remove_completed",
            ExtensionEvent::RemoveFailed { .. } => "remove_failed",
            ExtensionEvent::OutdatedDetected { .. } => "outdated_detected",
            ExtensionEvent::ValidationSucceeded { .. } => "validation_succeeded",
            ExtensionEvent::ValidationFailed { .. } => "validation_failed",
        }
        .to_string()
    }
}

/// Ledger statistics
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LedgerStats {
    pub total_events: usize,
    pub file_size_bytes: u64,
    pub oldest_timestamp: Option<DateTime<Utc>>,
    pub newest_timestamp: Option<DateTime<Utc>>,
    pub event_type_counts: HashMap<String, usize>,
}
