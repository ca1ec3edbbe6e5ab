//! Context Merger (C9): folds an extension's project-context `mergeFile`
//! into a target file in the workspace using one of five strategies.

use anyhow::{Context as _, Result};
use sindri_core::types::{MergeFileConfig, MergeStrategy};
use std::path::{Path, PathBuf};
use tracing::info;

pub struct ContextMerger {
    extension_dir: PathBuf,
    workspace_dir: PathBuf,
}

impl ContextMerger {
    pub fn new(extension_dir: impl Into<PathBuf>, workspace_dir: impl Into<PathBuf>) -> Self {
        Self {
            extension_dir: extension_dir.into(),
            workspace_dir: workspace_dir.into(),
        }
    }

    /// Apply `config.strategy`, reading `config.source` relative to the
    /// extension's own directory and writing `config.target` relative to
    /// the workspace. Returns the number of bytes written.
    pub fn merge(&self, ext_name: &str, config: &MergeFileConfig) -> Result<usize> {
        let source_path = self.extension_dir.join(&config.source);
        let target_path = self.workspace_dir.join(&config.target);

        let source_content = std::fs::read_to_string(&source_path)
            .with_context(|| format!("reading merge source {:?}", source_path))?;

        let existing = std::fs::read_to_string(&target_path).unwrap_or_default();

        let merged = match config.strategy {
            MergeStrategy::Replace => source_content.clone(),
            MergeStrategy::Append => join_with_separator(&existing, &source_content),
            MergeStrategy::Prepend => join_with_separator(&source_content, &existing),
            MergeStrategy::AppendIfMissing => {
                if existing.contains(source_content.trim_end()) {
                    existing.clone()
                } else {
                    join_with_separator(&existing, &source_content)
                }
            }
            MergeStrategy::Merge => merge_lines(&existing, &source_content),
        };

        if let Some(parent) = target_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating parent directory for {:?}", target_path))?;
        }
        std::fs::write(&target_path, &merged)
            .with_context(|| format!("writing merged context to {:?}", target_path))?;

        info!(
            "merged project context for {} into {:?} ({:?})",
            ext_name, target_path, config.strategy
        );

        Ok(merged.len())
    }

    pub fn extension_dir(&self) -> &Path {
        &self.extension_dir
    }
}

fn join_with_separator(first: &str, second: &str) -> String {
    if first.is_empty() {
        return second.to_string();
    }
    if first.ends_with('\n') {
        format!("{}{}", first, second)
    } else {
        format!("{}\n{}", first, second)
    }
}

/// Line-union merge: every line already in `existing` is kept in place;
/// lines from `incoming` not already present are appended in order.
fn merge_lines(existing: &str, incoming: &str) -> String {
    let mut seen: std::collections::HashSet<&str> = existing.lines().collect();
    let mut result = existing.to_string();
    for line in incoming.lines() {
        if seen.insert(line) {
            if !result.is_empty() && !result.ends_with('\n') {
                result.push('\n');
            }
            result.push_str(line);
            result.push('\n');
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn append_joins_with_newline() {
        let ext_dir = tempdir().unwrap();
        let ws_dir = tempdir().unwrap();
        write(ext_dir.path(), "snippet.md", "new section\n");
        write(ws_dir.path(), "CONTEXT.md", "existing\n");

        let merger = ContextMerger::new(ext_dir.path(), ws_dir.path());
        let config = MergeFileConfig {
            source: "snippet.md".to_string(),
            target: "CONTEXT.md".to_string(),
            strategy: MergeStrategy::Append,
        };
        merger.merge("demo", &config).unwrap();

        let result = std::fs::read_to_string(ws_dir.path().join("CONTEXT.md")).unwrap();
        assert_eq!(result, "existing\nnew section\n");
    }

    #[test]
    fn append_if_missing_skips_duplicate_content() {
        let ext_dir = tempdir().unwrap();
        let ws_dir = tempdir().unwrap();
        write(ext_dir.path(), "snippet.md", "shared line");
        write(ws_dir.path(), "CONTEXT.md", "shared line\n");

        let merger = ContextMerger::new(ext_dir.path(), ws_dir.path());
        let config = MergeFileConfig {
            source: "snippet.md".to_string(),
            target: "CONTEXT.md".to_string(),
            strategy: MergeStrategy::AppendIfMissing,
        };
        merger.merge("demo", &config).unwrap();

        let result = std::fs::read_to_string(ws_dir.path().join("CONTEXT.md")).unwrap();
        assert_eq!(result, "shared line\n");
    }

    #[test]
    fn merge_strategy_unions_lines_without_duplication() {
        let ext_dir = tempdir().unwrap();
        let ws_dir = tempdir().unwrap();
        write(ext_dir.path(), "snippet.md", "a\nb\nc\n");
        write(ws_dir.path(), "CONTEXT.md", "b\nd\n");

        let merger = ContextMerger::new(ext_dir.path(), ws_dir.path());
        let config = MergeFileConfig {
            source: "snippet.md".to_string(),
            target: "CONTEXT.md".to_string(),
            strategy: MergeStrategy::Merge,
        };
        merger.merge("demo", &config).unwrap();

        let result = std::fs::read_to_string(ws_dir.path().join("CONTEXT.md")).unwrap();
        assert_eq!(result, "b\nd\na\nc\n");
    }

    #[test]
    fn replace_ignores_previous_content() {
        let ext_dir = tempdir().unwrap();
        let ws_dir = tempdir().unwrap();
        write(ext_dir.path(), "snippet.md", "fresh\n");
        write(ws_dir.path(), "CONTEXT.md", "stale\n");

        let merger = ContextMerger::new(ext_dir.path(), ws_dir.path());
        let config = MergeFileConfig {
            source: "snippet.md".to_string(),
            target: "CONTEXT.md".to_string(),
            strategy: MergeStrategy::Replace,
        };
        merger.merge("demo", &config).unwrap();

        let result = std::fs::read_to_string(ws_dir.path().join("CONTEXT.md")).unwrap();
        assert_eq!(result, "fresh\n");
    }
}
