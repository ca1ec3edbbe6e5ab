//! Profile-based extension installation
//!
//! Profiles are defined in profiles.yaml and contain a curated set of extensions.
//! This module installs every extension in a profile against the locally loaded
//! registry: dependency resolution, install, then (for extensions that declare
//! it) the project-init/auth/collision/context pipeline.

use anyhow::{anyhow, Context, Result};
use sindri_core::config::SindriConfig;
use sindri_core::types::ExtensionState;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::capability::CapabilityReader;
use crate::collision::CollisionEngine;
use crate::context::ContextMerger;
use crate::dependency::DependencyResolver;
use crate::events::{EventEnvelope, ExtensionEvent};
use crate::executor::ExtensionExecutor;
use crate::hooks::{HookPoint, HooksManager};
use crate::ledger::StatusLedger;
use crate::project_init::ProjectInitDispatcher;
use crate::registry::ExtensionRegistry;

/// Progress callback type for profile installations
pub type ProgressCallback<'a> = Option<&'a dyn Fn(usize, usize, &str)>;

/// Installation phase where an error occurred
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallPhase {
    /// Error during installation execution
    Install,
    /// Error during post-install validation
    Validate,
    /// Error during the project-init pipeline (auth/collision/init/context)
    ProjectInit,
}

impl std::fmt::Display for InstallPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstallPhase::Install => write!(f, "Install"),
            InstallPhase::Validate => write!(f, "Validate"),
            InstallPhase::ProjectInit => write!(f, "Project Init"),
        }
    }
}

/// Information about a failed extension installation
#[derive(Debug, Clone)]
pub struct FailedExtension {
    pub name: String,
    pub error: String,
    pub phase: InstallPhase,
}

/// Successfully installed extension information
#[derive(Debug, Clone)]
pub struct InstalledExtension {
    pub name: String,
    pub version: String,
}

/// Result of a profile installation
#[derive(Debug)]
pub struct ProfileInstallResult {
    pub installed_extensions: Vec<InstalledExtension>,
    pub installed_count: usize,
    pub failed_count: usize,
    pub failed_extensions: Vec<FailedExtension>,
    pub total_count: usize,
}

impl ProfileInstallResult {
    pub fn is_success(&self) -> bool {
        self.failed_count == 0
    }

    pub fn is_partial(&self) -> bool {
        self.installed_count > 0 && self.failed_count > 0
    }
}

/// Profile installer for batch extension installation
pub struct ProfileInstaller {
    registry: ExtensionRegistry,
    executor: ExtensionExecutor,
    ledger: StatusLedger,
    workspace_dir: PathBuf,
    config: SindriConfig,
}

impl ProfileInstaller {
    pub fn new(
        registry: ExtensionRegistry,
        executor: ExtensionExecutor,
        ledger: StatusLedger,
        workspace_dir: impl Into<PathBuf>,
        config: SindriConfig,
    ) -> Self {
        Self {
            registry,
            executor,
            ledger,
            workspace_dir: workspace_dir.into(),
            config,
        }
    }

    fn is_installed(&self, name: &str) -> bool {
        self.ledger
            .get_all_latest_status()
            .ok()
            .and_then(|map| {
                map.get(name)
                    .map(|s| s.current_state == ExtensionState::Installed)
            })
            .unwrap_or(false)
    }

    fn get_version(&self, name: &str) -> Option<String> {
        self.ledger
            .get_all_latest_status()
            .ok()
            .and_then(|map| map.get(name).and_then(|s| s.version.clone()))
    }

    fn publish_event(&self, envelope: EventEnvelope) {
        if let Err(e) = self.ledger.append(envelope) {
            warn!("Failed to publish event to ledger: {}", e);
        }
    }

    /// Install all extensions in a profile.
    ///
    /// 1. Resolve every profile member plus transitive dependencies against
    ///    the already-loaded registry (C1+C3).
    /// 2. Install protected extensions first, then the rest, in resolved
    ///    order, skipping anything already installed.
    /// 3. For each newly installed extension, run its project-init pipeline
    ///    (C6 auth -> C7 collision -> C5 commands -> C9 context merge),
    ///    continuing past failures so one bad extension doesn't sink the
    ///    whole profile.
    pub async fn install_profile(
        &mut self,
        profile_name: &str,
        progress_callback: ProgressCallback<'_>,
    ) -> Result<ProfileInstallResult> {
        info!("Installing profile: {}", profile_name);

        let profile_extensions = {
            let profile = self
                .registry
                .get_profile(profile_name)
                .ok_or_else(|| anyhow!("Unknown profile: {}", profile_name))?;

            if profile.extensions.is_empty() {
                return Err(anyhow!(
                    "Profile '{}' has no extensions defined",
                    profile_name
                ));
            }

            debug!(
                "Profile '{}' contains {} extensions",
                profile_name,
                profile.extensions.len()
            );

            profile.extensions.clone()
        };

        for name in &profile_extensions {
            if !self.registry.has_extension(name) {
                return Err(anyhow!(
                    "Extension '{}' referenced by profile '{}' was not found. Available: {:?}",
                    name,
                    profile_name,
                    self.registry.list_extensions()
                ));
            }
        }

        let resolver = DependencyResolver::new(&self.registry);
        let mut all_extensions = Vec::new();
        for ext_name in &profile_extensions {
            let resolved = resolver
                .resolve(ext_name)
                .context(format!("Failed to resolve dependencies for {}", ext_name))?;
            for resolved_ext in resolved {
                if !all_extensions.contains(&resolved_ext) {
                    all_extensions.push(resolved_ext);
                }
            }
        }

        debug!(
            "Total extensions to install (with deps): {}",
            all_extensions.len()
        );

        let (protected_exts, regular_exts): (Vec<_>, Vec<_>) = all_extensions
            .into_iter()
            .partition(|name| self.registry.is_protected(name));

        let mut installed_count = 0;
        let mut failed_count = 0;
        let mut failed_extensions = Vec::new();
        let mut installed_extensions = Vec::new();

        let total_count = protected_exts.len() + regular_exts.len();
        let mut current = 0;

        for ext_name in protected_exts.iter().chain(regular_exts.iter()) {
            current += 1;

            if self.is_installed(ext_name) {
                debug!("Extension {} already installed, skipping", ext_name);
                installed_count += 1;
                if let Some(version) = self.get_version(ext_name) {
                    installed_extensions.push(InstalledExtension {
                        name: ext_name.clone(),
                        version,
                    });
                }
                if let Some(callback) = progress_callback {
                    callback(current, total_count, ext_name);
                }
                continue;
            }

            info!(
                "Installing extension: {} ({}/{})",
                ext_name, current, total_count
            );
            if let Some(callback) = progress_callback {
                callback(current, total_count, ext_name);
            }

            match self.install_single_extension(ext_name).await {
                Ok(version) => {
                    installed_count += 1;
                    info!("Extension {} installed successfully", ext_name);
                    installed_extensions.push(InstalledExtension {
                        name: ext_name.clone(),
                        version,
                    });
                }
                Err((phase, e)) => {
                    failed_count += 1;
                    failed_extensions.push(FailedExtension {
                        name: ext_name.clone(),
                        error: e.to_string(),
                        phase,
                    });
                    warn!("Extension {} failed: {} (continuing...)", ext_name, e);
                }
            }
        }

        let result = ProfileInstallResult {
            installed_extensions,
            installed_count,
            failed_count,
            failed_extensions,
            total_count,
        };

        if result.is_success() {
            info!(
                "Profile '{}' installed successfully ({} extensions)",
                profile_name, installed_count
            );
        } else if result.is_partial() {
            warn!(
                "Profile '{}' partially installed: {} succeeded, {} failed",
                profile_name, installed_count, failed_count
            );
        } else {
            warn!(
                "Profile '{}' installation failed: all {} extensions failed",
                profile_name, failed_count
            );
        }

        Ok(result)
    }

    /// Reinstall all extensions in a profile: clear their ledger state,
    /// then run `install_profile` again.
    pub async fn reinstall_profile(
        &mut self,
        profile_name: &str,
        progress_callback: ProgressCallback<'_>,
    ) -> Result<ProfileInstallResult> {
        info!("Reinstalling profile: {}", profile_name);

        let profile_extensions = {
            let profile = self
                .registry
                .get_profile(profile_name)
                .ok_or_else(|| anyhow!("Unknown profile: {}", profile_name))?;

            if profile.extensions.is_empty() {
                return Err(anyhow!(
                    "Profile '{}' has no extensions defined",
                    profile_name
                ));
            }
            profile.extensions.clone()
        };

        let resolver = DependencyResolver::new(&self.registry);
        let mut all_extensions = Vec::new();
        for ext_name in &profile_extensions {
            let resolved = resolver
                .resolve(ext_name)
                .context(format!("Failed to resolve dependencies for {}", ext_name))?;
            for resolved_ext in resolved {
                if !all_extensions.contains(&resolved_ext) {
                    all_extensions.push(resolved_ext);
                }
            }
        }

        info!("Removing existing extensions...");
        for ext_name in all_extensions.iter().rev() {
            if self.is_installed(ext_name) {
                debug!("Removing extension: {}", ext_name);
                self.publish_event(EventEnvelope::new(
                    ext_name.clone(),
                    Some(ExtensionState::Installed),
                    ExtensionState::Removing,
                    ExtensionEvent::RemoveCompleted {
                        extension_name: ext_name.clone(),
                        version: self.get_version(ext_name).unwrap_or_default(),
                        duration_secs: 0,
                    },
                ));
            }
        }

        self.install_profile(profile_name, progress_callback).await
    }

    /// Install a single extension, then (best-effort) run its project-init
    /// pipeline. Returns the installed version, or the phase and error on
    /// failure.
    async fn install_single_extension(
        &mut self,
        name: &str,
    ) -> Result<String, (InstallPhase, anyhow::Error)> {
        self.publish_event(EventEnvelope::new(
            name.to_string(),
            None,
            ExtensionState::Installing,
            ExtensionEvent::InstallStarted {
                extension_name: name.to_string(),
                version: "installing".to_string(),
                source: "local".to_string(),
                install_method: "Profile".to_string(),
            },
        ));

        let start_time = std::time::Instant::now();

        let extension = self
            .registry
            .get_extension(name)
            .ok_or_else(|| (InstallPhase::Install, anyhow!("Extension {} not found in registry", name)))?
            .clone();

        let version = extension.metadata.version.clone();

        let install_result = self.executor.install(&extension).await;
        let duration_secs = start_time.elapsed().as_secs();

        match install_result {
            Ok(_) => {
                let validation_result = self
                    .executor
                    .validate_extension(&extension)
                    .await
                    .map_err(|e| (InstallPhase::Validate, e))?;

                if !validation_result {
                    self.publish_event(EventEnvelope::new(
                        name.to_string(),
                        Some(ExtensionState::Installing),
                        ExtensionState::Failed,
                        ExtensionEvent::InstallFailed {
                            extension_name: name.to_string(),
                            version: version.clone(),
                            error_message: "Validation failed".to_string(),
                            retry_count: 0,
                            duration_secs,
                        },
                    ));
                    return Err((InstallPhase::Validate, anyhow!("Extension {} failed validation", name)));
                }

                self.publish_event(EventEnvelope::new(
                    name.to_string(),
                    Some(ExtensionState::Installing),
                    ExtensionState::Installed,
                    ExtensionEvent::InstallCompleted {
                        extension_name: name.to_string(),
                        version: version.clone(),
                        duration_secs,
                        components_installed: vec![],
                    },
                ));

                if let Err(e) = self.run_project_init(name, &extension).await {
                    warn!("project-init pipeline for {} did not complete: {}", name, e);
                }

                Ok(version)
            }
            Err(e) => {
                self.publish_event(EventEnvelope::new(
                    name.to_string(),
                    Some(ExtensionState::Installing),
                    ExtensionState::Failed,
                    ExtensionEvent::InstallFailed {
                        extension_name: name.to_string(),
                        version: version.clone(),
                        error_message: e.to_string(),
                        retry_count: 0,
                        duration_secs,
                    },
                ));
                Err((InstallPhase::Install, e))
            }
        }
    }

    /// Runs C6 auth gate -> C7 collision detection -> C5 project-init ->
    /// C9 context merge -> C8 post-project-init hook, in that order, for
    /// one freshly installed extension. Any stage failing here is logged
    /// and swallowed by the caller: the extension itself is still
    /// considered installed.
    async fn run_project_init(
        &self,
        name: &str,
        extension: &sindri_core::types::Extension,
    ) -> Result<()> {
        let reader = CapabilityReader::new(extension);
        if !reader.is_enabled("project-init") {
            return Ok(());
        }

        let ext_dir = self
            .registry
            .extensions_root()
            .map(|root| root.join(name))
            .unwrap_or_else(|| PathBuf::from(name));

        if let Some(collision_handling) = reader.collision_handling() {
            let collision_engine = CollisionEngine::new(&self.workspace_dir, &self.config);
            if let Some(detected) = collision_engine.detect_any(&collision_handling.version_markers)? {
                let installing = extension.metadata.version.clone();
                if let Some(scenario) =
                    collision_engine.resolve_scenario(&collision_handling.scenarios, &detected, &installing)
                {
                    let action = collision_engine.effective_action(scenario);
                    info!(
                        "collision scenario '{}' for {} resolved to {:?}",
                        scenario.name, name, action
                    );
                    if action == sindri_core::types::ScenarioAction::Stop {
                        return Err(anyhow!("collision scenario '{}' stopped project-init", scenario.name));
                    }
                    if action == sindri_core::types::ScenarioAction::Skip {
                        return Ok(());
                    }
                    if action == sindri_core::types::ScenarioAction::Backup {
                        collision_engine.backup_state_markers(&collision_handling.version_markers)?;
                    }
                }
            }
            for rule in &collision_handling.conflict_rules {
                let target = self.workspace_dir.join(&rule.path);
                if !target.exists() {
                    continue;
                }
                debug!("pre-existing conflict target {:?} left to on-install writers", target);
            }
        }

        let hooks_manager = HooksManager::new(&self.workspace_dir);
        hooks_manager
            .run(name, reader.hooks(), HookPoint::PreProjectInit)
            .await?;
        // A failing pre-project-init hook is a warning, not an abort:
        // this whole function treats every stage as best-effort.

        let dispatcher = ProjectInitDispatcher::new(&ext_dir, &self.workspace_dir);
        let report = dispatcher.run(extension).await?;
        debug!(
            "project-init for {} ran {} command(s), skipped {}",
            name,
            report.commands_run.len(),
            report.commands_skipped.len()
        );

        if let Some(project_context) = reader.project_context() {
            if project_context.enabled {
                if let Some(merge_file) = &project_context.merge_file {
                    let merger = ContextMerger::new(&ext_dir, &self.workspace_dir);
                    merger.merge(name, merge_file)?;
                }
            }
        }

        hooks_manager
            .run(name, reader.hooks(), HookPoint::PostProjectInit)
            .await?;

        Ok(())
    }

    pub fn list_profiles(&self) -> Vec<(&str, &str)> {
        self.registry
            .profiles
            .iter()
            .map(|(name, profile)| (name.as_str(), profile.description.as_str()))
            .collect()
    }

    pub fn get_profile_extensions(&self, profile_name: &str) -> Result<Vec<String>> {
        self.registry.get_profile_extensions(profile_name)
    }

    pub fn check_profile_status(&self, profile_name: &str) -> Result<ProfileStatus> {
        let extensions = self.registry.get_profile_extensions(profile_name)?;

        let installed: Vec<_> = extensions
            .iter()
            .filter(|name| self.is_installed(name))
            .cloned()
            .collect();

        let not_installed: Vec<_> = extensions
            .iter()
            .filter(|name| !self.is_installed(name))
            .cloned()
            .collect();

        Ok(ProfileStatus {
            profile_name: profile_name.to_string(),
            total_extensions: extensions.len(),
            installed_extensions: installed,
            not_installed_extensions: not_installed,
        })
    }
}

/// Status of a profile's extensions
#[derive(Debug)]
pub struct ProfileStatus {
    pub profile_name: String,
    pub total_extensions: usize,
    pub installed_extensions: Vec<String>,
    pub not_installed_extensions: Vec<String>,
}

impl ProfileStatus {
    pub fn is_fully_installed(&self) -> bool {
        self.not_installed_extensions.is_empty()
    }

    pub fn is_partially_installed(&self) -> bool {
        !self.installed_extensions.is_empty() && !self.not_installed_extensions.is_empty()
    }

    pub fn installed_percentage(&self) -> f64 {
        if self.total_extensions == 0 {
            0.0
        } else {
            (self.installed_extensions.len() as f64 / self.total_extensions as f64) * 100.0
        }
    }
}
