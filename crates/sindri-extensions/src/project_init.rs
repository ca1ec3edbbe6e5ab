//! Project-Init Dispatcher (C5).
//!
//! Runs an extension's `capabilities.project-init` commands against a
//! project workspace: idempotency short-circuit via state markers, an
//! auth gate per command, `bash scripts/...`/`sh scripts/...` rewriting
//! confined to the extension's own directory, whitelist-only `${NAME}`
//! expansion, and a final validation command.

use crate::auth::AuthManager;
use anyhow::{anyhow, Result};
use regex::Regex;
use sindri_core::types::{Extension, ProjectInitValidation, StateMarker, StateMarkerType};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Variables the redesigned expansion whitelists for substitution into a
/// project-init command. Anything else in a `${...}` placeholder is left
/// untouched rather than interpolated, closing the shell-injection surface
/// a naive `envsubst`-style expansion would open.
const ALLOWED_VARIABLES: &[&str] = &["HOME", "USER", "WORKSPACE", "PATH", "SHELL"];

#[derive(Debug, Default)]
pub struct ProjectInitReport {
    pub skipped_already_initialized: bool,
    pub commands_run: Vec<String>,
    pub commands_skipped: Vec<String>,
    pub validation_passed: Option<bool>,
}

pub struct ProjectInitDispatcher {
    extension_dir: PathBuf,
    workspace_dir: PathBuf,
    auth: AuthManager,
}

impl ProjectInitDispatcher {
    pub fn new(extension_dir: impl Into<PathBuf>, workspace_dir: impl Into<PathBuf>) -> Self {
        Self {
            extension_dir: extension_dir.into(),
            workspace_dir: workspace_dir.into(),
            auth: AuthManager::new(),
        }
    }

    /// Run the full project-init flow for one extension. No-ops if the
    /// extension declares no `project-init` capability or it is disabled.
    pub async fn run(&self, extension: &Extension) -> Result<ProjectInitReport> {
        let mut report = ProjectInitReport::default();

        let Some(capabilities) = &extension.capabilities else {
            return Ok(report);
        };
        let Some(init) = &capabilities.project_init else {
            return Ok(report);
        };
        if !init.enabled {
            return Ok(report);
        }

        if self.already_initialized(&init.state_markers)? {
            debug!(
                "project-init for {} short-circuited: state marker already present",
                extension.metadata.name
            );
            report.skipped_already_initialized = true;
            return Ok(report);
        }

        let vars = self.variable_table(extension);

        for command in &init.commands {
            if command.requires_auth != sindri_core::types::AuthProvider::None {
                if let Err(e) = self.auth.validate_provider(command.requires_auth, None) {
                    if command.conditional {
                        info!(
                            "skipping conditional command '{}' for {}: {}",
                            command.command, extension.metadata.name, e
                        );
                        report.commands_skipped.push(command.command.clone());
                        continue;
                    }
                    return Err(anyhow!(
                        "command '{}' requires auth that is unavailable: {}",
                        command.command,
                        e
                    ));
                }
            }

            if let Err(e) = self.run_command(&command.command, &vars).await {
                if command.conditional {
                    warn!(
                        "conditional command '{}' failed for {}: {}",
                        command.command, extension.metadata.name, e
                    );
                    report.commands_skipped.push(command.command.clone());
                    continue;
                }
                return Err(e);
            }
            report.commands_run.push(command.command.clone());
        }

        if let Some(validation) = &init.validation {
            report.validation_passed = Some(self.run_validation(validation, &vars).await?);
        }

        Ok(report)
    }

    /// All declared markers must exist (of their declared type) for the
    /// extension to be considered initialised; a single missing marker
    /// means re-run. An empty marker list is itself non-idempotent.
    fn already_initialized(&self, markers: &[StateMarker]) -> Result<bool> {
        if markers.is_empty() {
            return Ok(false);
        }
        for marker in markers {
            let path = self.workspace_dir.join(&marker.path);
            let present = match marker.r#type {
                StateMarkerType::Directory => path.is_dir(),
                StateMarkerType::File => path.is_file(),
                StateMarkerType::Symlink => path.is_symlink(),
                StateMarkerType::Other => path.exists(),
            };
            if !present {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn variable_table(&self, _extension: &Extension) -> HashMap<&'static str, String> {
        let mut vars = HashMap::new();
        vars.insert(
            "WORKSPACE",
            self.workspace_dir.to_string_lossy().into_owned(),
        );
        for passthrough in ["HOME", "USER", "PATH", "SHELL"] {
            if let Ok(value) = std::env::var(passthrough) {
                vars.insert(passthrough, value);
            }
        }
        vars
    }

    /// Expand only the whitelisted `${NAME}` placeholders; everything else,
    /// including unknown `${...}` references, is passed through verbatim.
    fn expand(&self, input: &str, vars: &HashMap<&'static str, String>) -> String {
        let mut output = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(start) = rest.find("${") {
            let Some(end_offset) = rest[start..].find('}') else {
                output.push_str(rest);
                return output;
            };
            let end = start + end_offset;
            let name = &rest[start + 2..end];
            output.push_str(&rest[..start]);
            if ALLOWED_VARIABLES.contains(&name) {
                if let Some(value) = vars.get(name) {
                    output.push_str(value);
                } else {
                    output.push_str(&rest[start..=end]);
                }
            } else {
                output.push_str(&rest[start..=end]);
            }
            rest = &rest[end + 1..];
        }
        output.push_str(rest);
        output
    }

    /// Rewrite a leading `bash scripts/...` or `sh scripts/...` invocation
    /// to an absolute path inside the extension's own directory, rejecting
    /// anything that would escape it. Commands that don't match this shape
    /// pass through untouched (they run via the shell as-is).
    fn rewrite_script_invocation(&self, command: &str) -> Result<String> {
        for interpreter in ["bash ", "sh "] {
            if let Some(rest) = command.strip_prefix(interpreter) {
                let (script_part, trailing) = rest.split_once(' ').unwrap_or((rest, ""));
                if script_part.starts_with("scripts/") {
                    let script_path = self.extension_dir.join(script_part);
                    self.validate_confined(&script_path)?;
                    let rewritten = if trailing.is_empty() {
                        format!("{}{}", interpreter, script_path.display())
                    } else {
                        format!("{}{} {}", interpreter, script_path.display(), trailing)
                    };
                    return Ok(rewritten);
                }
            }
        }
        Ok(command.to_string())
    }

    fn validate_confined(&self, script_path: &Path) -> Result<()> {
        for component in script_path.components() {
            if component == std::path::Component::ParentDir {
                return Err(anyhow!("script path escapes extension directory: {:?}", script_path));
            }
        }
        match (script_path.canonicalize(), self.extension_dir.canonicalize()) {
            (Ok(canon_script), Ok(canon_ext)) if !canon_script.starts_with(&canon_ext) => Err(
                anyhow!("script path escapes extension directory: {:?}", script_path),
            ),
            _ => Ok(()),
        }
    }

    async fn run_command(&self, raw: &str, vars: &HashMap<&'static str, String>) -> Result<()> {
        let rewritten = self.rewrite_script_invocation(raw)?;
        let expanded = self.expand(&rewritten, vars);

        info!("running project-init command: {}", expanded);
        let output = Command::new("sh")
            .arg("-c")
            .arg(&expanded)
            .current_dir(&self.workspace_dir)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "project-init command '{}' failed ({}): {}",
                expanded,
                output.status,
                stderr.trim()
            ));
        }
        Ok(())
    }

    async fn run_validation(
        &self,
        validation: &ProjectInitValidation,
        vars: &HashMap<&'static str, String>,
    ) -> Result<bool> {
        let expanded = self.expand(&validation.command, vars);
        let output = Command::new("sh")
            .arg("-c")
            .arg(&expanded)
            .current_dir(&self.workspace_dir)
            .output()
            .await?;

        let exit_ok = output.status.code() == Some(validation.expected_exit_code);
        let pattern_ok = match &validation.expected_pattern {
            Some(pattern) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                Regex::new(pattern)
                    .map(|re| re.is_match(&stdout))
                    .unwrap_or(false)
            }
            None => true,
        };

        if !exit_ok || !pattern_ok {
            warn!(
                "project-init validation '{}' did not pass (exit_ok={}, pattern_ok={})",
                expanded, exit_ok, pattern_ok
            );
        }
        Ok(exit_ok && pattern_ok)
    }
}
