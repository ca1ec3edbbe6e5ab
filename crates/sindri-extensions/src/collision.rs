//! Collision & Conflict Engine (C7).
//!
//! Three independent responsibilities, mirrored from the spec's data
//! model: detecting an already-installed version from `version-markers`,
//! picking the declared reaction for a detected/installing version pair
//! from `scenarios`, and applying a single `conflict-rules` entry to a
//! file or directory that a previous extension already created.

use anyhow::{Context, Result};
use chrono::Utc;
use regex::Regex;
use sindri_core::config::SindriConfig;
use sindri_core::types::{
    CollisionScenario, ConflictActionType, ConflictRule, DetectionMethod, OnConflictAction,
    ScenarioAction, VersionDetection, VersionMarker,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What happened when a conflict rule was applied to a path.
#[derive(Debug, PartialEq, Eq)]
pub enum ConflictOutcome {
    Written,
    BackedUp { backup_path: PathBuf },
    Skipped,
}

pub struct CollisionEngine<'a> {
    workspace_dir: PathBuf,
    config: &'a SindriConfig,
}

impl<'a> CollisionEngine<'a> {
    pub fn new(workspace_dir: impl Into<PathBuf>, config: &'a SindriConfig) -> Self {
        Self {
            workspace_dir: workspace_dir.into(),
            config,
        }
    }

    /// Evaluate a single version marker against the workspace. Returns the
    /// marker's declared `version` if the workspace state satisfies the
    /// marker's detection rule, `None` otherwise.
    pub fn detect_version(&self, marker: &VersionMarker) -> Result<Option<String>> {
        let path = self.workspace_dir.join(&marker.path);
        let matched = match marker.detection.method {
            DetectionMethod::Unknown => {
                debug!("skipping version marker with unrecognised detection method: {}", marker.path);
                false
            }
            DetectionMethod::FileExists => path.is_file(),
            DetectionMethod::DirectoryExists => {
                path.is_dir() && !self.any_exclude_exists(&marker.detection)
            }
            DetectionMethod::ContentMatch => self.content_matches(&path, &marker.detection)?,
        };

        Ok(matched.then(|| marker.version.clone()))
    }

    /// Try every marker in order, returning the first detected version.
    pub fn detect_any(&self, markers: &[VersionMarker]) -> Result<Option<String>> {
        for marker in markers {
            if let Some(version) = self.detect_version(marker)? {
                return Ok(Some(version));
            }
        }
        Ok(None)
    }

    /// Rename every existing state-marker path out of the way with a
    /// `<path>.backup.<UTC-yyyymmdd_HHMMSS>` suffix, for a scenario whose
    /// effective action is `ScenarioAction::Backup`. Markers that don't
    /// currently exist on disk are left alone.
    pub fn backup_state_markers(&self, markers: &[VersionMarker]) -> Result<()> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        for marker in markers {
            let path = self.workspace_dir.join(&marker.path);
            if !path.exists() {
                continue;
            }
            let backup_path = PathBuf::from(format!("{}.backup.{}", path.display(), timestamp));
            std::fs::rename(&path, &backup_path)
                .with_context(|| format!("backing up {:?} to {:?}", path, backup_path))?;
            info!("backed up {:?} to {:?}", path, backup_path);
        }
        Ok(())
    }

    fn any_exclude_exists(&self, detection: &VersionDetection) -> bool {
        detection
            .exclude_if
            .iter()
            .any(|p| self.workspace_dir.join(p).exists())
    }

    fn content_matches(&self, path: &Path, detection: &VersionDetection) -> Result<bool> {
        if !path.is_file() {
            return Ok(false);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {:?} for content-match detection", path))?;

        let mut matches = detection.patterns.iter().map(|pattern| {
            Regex::new(pattern)
                .map(|re| re.is_match(&content))
                .unwrap_or(false)
        });

        Ok(if detection.match_any {
            matches.any(|m| m)
        } else {
            !detection.patterns.is_empty() && matches.all(|m| m)
        })
    }

    /// Pick the scenario action declared for this detected/installing pair.
    /// A scenario's version fields act as exact matches; `"*"` matches any
    /// value for that side.
    pub fn resolve_scenario<'s>(
        &self,
        scenarios: &'s [CollisionScenario],
        detected_version: &str,
        installing_version: &str,
    ) -> Option<&'s CollisionScenario> {
        scenarios.iter().find(|s| {
            (s.detected_version == "*" || s.detected_version == detected_version)
                && (s.installing_version == "*" || s.installing_version == installing_version)
        })
    }

    /// Decide the effective action for a scenario, accounting for the
    /// non-interactive override precedence the rest of the engine uses.
    pub fn effective_action(&self, scenario: &CollisionScenario) -> ScenarioAction {
        if self.config.ci_mode || !self.config.conflict_prompt_enabled {
            if scenario.action == ScenarioAction::Prompt {
                return ScenarioAction::Skip;
            }
        }
        scenario.action
    }

    /// Apply one `conflict-rules` entry to `new_content` destined for
    /// `rule.path`, honouring the engine-wide override.
    pub fn apply_conflict_rule(
        &self,
        rule: &ConflictRule,
        new_content: &[u8],
    ) -> Result<ConflictOutcome> {
        let target = self.workspace_dir.join(&rule.path);
        let action = self.config.resolve_conflict_action(rule.on_conflict.action);

        if !target.exists() {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, new_content)?;
            return Ok(ConflictOutcome::Written);
        }

        self.apply_action(&target, action, new_content, &rule.on_conflict)
    }

    fn apply_action(
        &self,
        target: &Path,
        action: ConflictActionType,
        new_content: &[u8],
        on_conflict: &OnConflictAction,
    ) -> Result<ConflictOutcome> {
        match action {
            ConflictActionType::Skip | ConflictActionType::Prompt | ConflictActionType::PromptPerFile => {
                info!("collision at {:?} resolved as skip", target);
                Ok(ConflictOutcome::Skipped)
            }
            ConflictActionType::Overwrite => {
                std::fs::write(target, new_content)?;
                Ok(ConflictOutcome::Written)
            }
            ConflictActionType::Append => {
                self.append_with_separator(target, new_content, on_conflict.separator.as_deref())?;
                Ok(ConflictOutcome::Written)
            }
            ConflictActionType::Prepend => {
                let existing = std::fs::read(target)?;
                let mut combined = new_content.to_vec();
                if let Some(sep) = &on_conflict.separator {
                    combined.extend_from_slice(sep.as_bytes());
                }
                combined.extend_from_slice(&existing);
                std::fs::write(target, combined)?;
                Ok(ConflictOutcome::Written)
            }
            ConflictActionType::MergeJson => {
                self.merge_json(target, new_content)?;
                Ok(ConflictOutcome::Written)
            }
            ConflictActionType::MergeYaml => {
                self.merge_yaml(target, new_content)?;
                Ok(ConflictOutcome::Written)
            }
            ConflictActionType::Merge => {
                self.append_with_separator(target, new_content, on_conflict.separator.as_deref())?;
                Ok(ConflictOutcome::Written)
            }
            ConflictActionType::Backup => {
                let backup_path = self.backup_path(target, &on_conflict.backup_suffix);
                std::fs::copy(target, &backup_path)?;
                warn!("backed up existing {:?} to {:?} without replacing it", target, backup_path);
                Ok(ConflictOutcome::BackedUp { backup_path })
            }
            ConflictActionType::BackupAndReplace => {
                let backup_path = self.backup_path(target, &on_conflict.backup_suffix);
                std::fs::copy(target, &backup_path)?;
                std::fs::write(target, new_content)?;
                Ok(ConflictOutcome::BackedUp { backup_path })
            }
        }
    }

    fn append_with_separator(&self, target: &Path, new_content: &[u8], separator: Option<&str>) -> Result<()> {
        let mut existing = std::fs::read(target)?;
        if let Some(sep) = separator {
            existing.extend_from_slice(sep.as_bytes());
        }
        existing.extend_from_slice(new_content);
        std::fs::write(target, existing)?;
        Ok(())
    }

    fn merge_json(&self, target: &Path, new_content: &[u8]) -> Result<()> {
        let existing: serde_json::Value = serde_json::from_slice(&std::fs::read(target)?)
            .unwrap_or(serde_json::Value::Object(Default::default()));
        let incoming: serde_json::Value = serde_json::from_slice(new_content)
            .context("parsing incoming content as JSON for merge-json")?;
        let merged = merge_json_values(existing, incoming);
        std::fs::write(target, serde_json::to_vec_pretty(&merged)?)?;
        Ok(())
    }

    fn merge_yaml(&self, target: &Path, new_content: &[u8]) -> Result<()> {
        let existing: serde_yaml_ng::Value = serde_yaml_ng::from_slice(&std::fs::read(target)?)
            .unwrap_or(serde_yaml_ng::Value::Null);
        let incoming: serde_yaml_ng::Value = serde_yaml_ng::from_slice(new_content)
            .context("parsing incoming content as YAML for merge-yaml")?;
        let merged = merge_yaml_values(existing, incoming);
        std::fs::write(target, serde_yaml_ng::to_string(&merged)?)?;
        Ok(())
    }

    fn backup_path(&self, target: &Path, suffix: &str) -> PathBuf {
        let timestamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let file_name = target
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("backup");
        target.with_file_name(format!("{}.{}{}", file_name, timestamp, suffix))
    }
}

fn merge_json_values(base: serde_json::Value, incoming: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match (base, incoming) {
        (Value::Object(mut a), Value::Object(b)) => {
            for (k, v) in b {
                let merged = match a.remove(&k) {
                    Some(existing) => merge_json_values(existing, v),
                    None => v,
                };
                a.insert(k, merged);
            }
            Value::Object(a)
        }
        (Value::Array(mut a), Value::Array(b)) => {
            a.extend(b);
            Value::Array(a)
        }
        (_, incoming) => incoming,
    }
}

fn merge_yaml_values(base: serde_yaml_ng::Value, incoming: serde_yaml_ng::Value) -> serde_yaml_ng::Value {
    use serde_yaml_ng::Value;
    match (base, incoming) {
        (Value::Mapping(mut a), Value::Mapping(b)) => {
            for (k, v) in b {
                let merged = match a.remove(&k) {
                    Some(existing) => merge_yaml_values(existing, v),
                    None => v,
                };
                a.insert(k, merged);
            }
            Value::Mapping(a)
        }
        (Value::Sequence(mut a), Value::Sequence(b)) => {
            a.extend(b);
            Value::Sequence(a)
        }
        (_, incoming) => incoming,
    }
}
