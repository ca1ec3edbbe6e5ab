//! Lifecycle Hooks Manager (C8).
//!
//! Runs the four declared hook points (`pre-install`, `post-install`,
//! `pre-project-init`, `post-project-init`) as shell commands in the
//! workspace directory. This manager only reports what happened
//! (`HookOutcome`) and never turns a nonzero exit into an `Err` itself —
//! whether a failure aborts the containing operation is decided by the
//! caller (install aborts on pre-install failure; post-* failures warn
//! only).

use anyhow::{Context, Result};
use sindri_core::types::{HookConfig, HooksCapability};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{info, warn};

/// Outcome of running a single hook point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    /// No hook was declared for this point.
    NotDeclared,
    /// The hook ran and exited successfully.
    Ran,
    /// The hook ran but exited non-zero. Whether this aborts the
    /// containing operation is left to the caller.
    Failed,
}

impl HookOutcome {
    pub fn failed(self) -> bool {
        matches!(self, HookOutcome::Failed)
    }
}

/// Which of the four lifecycle points a hook fires at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    PreInstall,
    PostInstall,
    PreProjectInit,
    PostProjectInit,
}

impl HookPoint {
    fn label(self) -> &'static str {
        match self {
            HookPoint::PreInstall => "pre-install",
            HookPoint::PostInstall => "post-install",
            HookPoint::PreProjectInit => "pre-project-init",
            HookPoint::PostProjectInit => "post-project-init",
        }
    }

    fn select(self, hooks: &HooksCapability) -> Option<&HookConfig> {
        match self {
            HookPoint::PreInstall => hooks.pre_install.as_ref(),
            HookPoint::PostInstall => hooks.post_install.as_ref(),
            HookPoint::PreProjectInit => hooks.pre_project_init.as_ref(),
            HookPoint::PostProjectInit => hooks.post_project_init.as_ref(),
        }
    }
}

/// Runs a single extension's lifecycle hooks against a fixed working
/// directory (the project workspace, not the extension's own directory).
pub struct HooksManager {
    workspace_dir: PathBuf,
}

impl HooksManager {
    pub fn new(workspace_dir: impl Into<PathBuf>) -> Self {
        Self {
            workspace_dir: workspace_dir.into(),
        }
    }

    /// Run the hook at `point`, if the extension declares one. A hook's
    /// exit status is reported in the outcome but never turned into an
    /// `Err` here — whether a failure aborts the containing operation is
    /// the caller's decision (install aborts on pre-install failure;
    /// post-* failures and missing hooks are always a no-op/warn).
    pub async fn run(
        &self,
        ext_name: &str,
        hooks: Option<&HooksCapability>,
        point: HookPoint,
    ) -> Result<HookOutcome> {
        let Some(hook) = hooks.and_then(|h| point.select(h)) else {
            return Ok(HookOutcome::NotDeclared);
        };
        let success = self.run_hook(ext_name, hook, point).await?;
        Ok(if success {
            HookOutcome::Ran
        } else {
            HookOutcome::Failed
        })
    }

    async fn run_hook(&self, ext_name: &str, hook: &HookConfig, point: HookPoint) -> Result<bool> {
        let phase = point.label();
        match &hook.description {
            Some(desc) => info!("Executing {} hook for {}: {}", phase, ext_name, desc),
            None => info!("Executing {} hook for {}", phase, ext_name),
        }

        let output = Command::new("bash")
            .arg("-c")
            .arg(&hook.command)
            .current_dir(&self.workspace_dir)
            .output()
            .await
            .context(format!("failed to execute {} hook for {}", phase, ext_name))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                "{} hook for {} exited with {}: {}",
                phase,
                ext_name,
                output.status,
                stderr.trim()
            );
            return Ok(false);
        }

        Ok(true)
    }

    pub fn workspace_dir(&self) -> &Path {
        &self.workspace_dir
    }
}
