//! Local installation manifest management
//!
//! The manifest tracks which extensions are installed locally,
//! their versions, and installation state. Located at:
//! ~/.sindri/manifest.yaml
//!
//! Structure follows section 6.3 "Manifest File" from the planning doc:
//! ```yaml
//! schema_version: "1.0"
//! cli_version: "3.0.0"
//! last_updated: "2026-01-21T10:00:00Z"
//! extensions:
//!   python:
//!     version: "1.2.0"
//!     installed_at: "2026-01-20T15:30:00Z"
//!     source: "github:pacphi/sindri"
//!     state: installed
//! ```

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sindri_core::types::{ExtensionState, InstallManifest, InstalledExtension};
use sindri_core::utils::is_valid_extension_name;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Reject any extension name that doesn't match `^[a-z0-9-]+$` before it is
/// written into the store, so the manifest can never be seeded with a name
/// that could later be interpreted as a path component elsewhere (C4's apt
/// keyring/sources filenames derive from the same names).
fn validate_name(name: &str) -> Result<()> {
    if is_valid_extension_name(name) {
        Ok(())
    } else {
        Err(anyhow!(
            "extension name '{}' fails name validation (^[a-z0-9-]+$)",
            name
        ))
    }
}

/// Manifest manager for tracking installed extensions
pub struct ManifestManager {
    /// Path to manifest file
    manifest_path: PathBuf,

    /// Current manifest data
    manifest: InstallManifest,
}

impl ManifestManager {
    /// Create a new manifest manager
    ///
    /// Creates the manifest file if it doesn't exist.
    pub fn new(manifest_path: PathBuf) -> Result<Self> {
        debug!("Loading manifest from: {:?}", manifest_path);

        let manifest = if manifest_path.exists() {
            Self::load_manifest(&manifest_path)?
        } else {
            info!("Creating new manifest at: {:?}", manifest_path);
            let manifest = InstallManifest::default();
            Self::ensure_parent_dir(&manifest_path)?;
            Self::save_manifest(&manifest_path, &manifest)?;
            manifest
        };

        Ok(Self {
            manifest_path,
            manifest,
        })
    }

    /// Load manifest from default location (~/.sindri/manifest.yaml)
    pub fn load_default() -> Result<Self> {
        let manifest_path = Self::default_manifest_path()?;
        Self::new(manifest_path)
    }

    /// Get the default manifest path
    pub fn default_manifest_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
        Ok(home.join(".sindri").join("manifest.yaml"))
    }

    /// Ensure parent directory exists
    fn ensure_parent_dir(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Load manifest from file under a shared lock, so a concurrent writer
    /// can't be observed mid-write.
    fn load_manifest(path: &Path) -> Result<InstallManifest> {
        use fs4::fs_std::FileExt;
        use std::io::Read;

        let mut file = std::fs::File::open(path)?;
        file.lock_shared().context("locking manifest for read")?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        FileExt::unlock(&file).ok();

        let manifest: InstallManifest = serde_yaml_ng::from_str(&content)?;
        debug!(
            "Loaded manifest with {} extensions",
            manifest.extensions.len()
        );
        Ok(manifest)
    }

    /// Save manifest to file under an exclusive lock.
    fn save_manifest(path: &Path, manifest: &InstallManifest) -> Result<()> {
        use fs4::fs_std::FileExt;
        use std::io::{Seek, SeekFrom, Write};

        let content = serde_yaml_ng::to_string(manifest)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)?;
        file.lock_exclusive().context("locking manifest for write")?;
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        FileExt::unlock(&file).ok();

        debug!(
            "Saved manifest with {} extensions",
            manifest.extensions.len()
        );
        Ok(())
    }

    /// Save current manifest to disk
    pub fn save(&mut self) -> Result<()> {
        self.manifest.last_updated = Utc::now();
        Self::save_manifest(&self.manifest_path, &self.manifest)
    }

    /// Check if an extension is installed
    pub fn is_installed(&self, name: &str) -> bool {
        self.manifest
            .extensions
            .get(name)
            .map(|ext| ext.state == ExtensionState::Installed)
            .unwrap_or(false)
    }

    /// Get installed extension info
    pub fn get_installed(&self, name: &str) -> Option<&InstalledExtension> {
        self.manifest.extensions.get(name)
    }

    /// Get installed version
    pub fn get_version(&self, name: &str) -> Option<&str> {
        self.manifest
            .extensions
            .get(name)
            .map(|ext| ext.version.as_str())
    }

    /// List all installed extensions
    pub fn list_installed(&self) -> Vec<(&str, &InstalledExtension)> {
        self.manifest
            .extensions
            .iter()
            .filter(|(_, ext)| ext.state == ExtensionState::Installed)
            .map(|(name, ext)| (name.as_str(), ext))
            .collect()
    }

    /// List all extensions (including failed/outdated)
    pub fn list_all(&self) -> Vec<(&str, &InstalledExtension)> {
        self.manifest
            .extensions
            .iter()
            .map(|(name, ext)| (name.as_str(), ext))
            .collect()
    }

    /// Mark extension as installed
    pub fn mark_installed(&mut self, name: &str, version: &str, source: &str) -> Result<()> {
        validate_name(name)?;
        info!("Marking {} {} as installed", name, version);

        let extension = InstalledExtension {
            version: version.to_string(),
            installed_at: Utc::now(),
            source: source.to_string(),
            state: ExtensionState::Installed,
        };

        self.manifest.extensions.insert(name.to_string(), extension);
        self.save()
    }

    /// Mark extension as installing
    pub fn mark_installing(&mut self, name: &str, version: &str, source: &str) -> Result<()> {
        validate_name(name)?;
        debug!("Marking {} {} as installing", name, version);

        let extension = InstalledExtension {
            version: version.to_string(),
            installed_at: Utc::now(),
            source: source.to_string(),
            state: ExtensionState::Installing,
        };

        self.manifest.extensions.insert(name.to_string(), extension);
        self.save()
    }

    /// Mark extension as failed
    pub fn mark_failed(&mut self, name: &str) -> Result<()> {
        warn!("Marking {} as failed", name);

        if let Some(ext) = self.manifest.extensions.get_mut(name) {
            ext.state = ExtensionState::Failed;
            self.save()
        } else {
            Err(anyhow!("Extension {} not found in manifest", name))
        }
    }

    /// Mark extension as outdated
    pub fn mark_outdated(&mut self, name: &str) -> Result<()> {
        debug!("Marking {} as outdated", name);

        if let Some(ext) = self.manifest.extensions.get_mut(name) {
            ext.state = ExtensionState::Outdated;
            self.save()
        } else {
            Err(anyhow!("Extension {} not found in manifest", name))
        }
    }

    /// Mark extension as removing
    pub fn mark_removing(&mut self, name: &str) -> Result<()> {
        debug!("Marking {} as removing", name);

        if let Some(ext) = self.manifest.extensions.get_mut(name) {
            ext.state = ExtensionState::Removing;
            self.save()
        } else {
            Err(anyhow!("Extension {} not found in manifest", name))
        }
    }

    /// Mark extension as uninstalled (removes from manifest)
    ///
    /// This is an alias for `remove()` to match the bash implementation's terminology
    pub fn mark_uninstalled(&mut self, name: &str) -> Result<()> {
        self.remove(name)
    }

    /// Remove extension from manifest
    pub fn remove(&mut self, name: &str) -> Result<()> {
        info!("Removing {} from manifest", name);

        if self.manifest.extensions.remove(name).is_some() {
            self.save()
        } else {
            Err(anyhow!("Extension {} not found in manifest", name))
        }
    }

    /// Update extension version
    pub fn update_version(&mut self, name: &str, new_version: &str) -> Result<()> {
        info!("Updating {} to version {}", name, new_version);

        if let Some(ext) = self.manifest.extensions.get_mut(name) {
            ext.version = new_version.to_string();
            ext.installed_at = Utc::now();
            ext.state = ExtensionState::Installed;
            self.save()
        } else {
            Err(anyhow!("Extension {} not found in manifest", name))
        }
    }

    /// Get extensions by state
    pub fn get_by_state(&self, state: ExtensionState) -> Vec<(&str, &InstalledExtension)> {
        self.manifest
            .extensions
            .iter()
            .filter(|(_, ext)| ext.state == state)
            .map(|(name, ext)| (name.as_str(), ext))
            .collect()
    }

    /// Get failed extensions
    pub fn get_failed(&self) -> Vec<(&str, &InstalledExtension)> {
        self.get_by_state(ExtensionState::Failed)
    }

    /// Get outdated extensions
    pub fn get_outdated(&self) -> Vec<(&str, &InstalledExtension)> {
        self.get_by_state(ExtensionState::Outdated)
    }

    /// Get CLI version from manifest
    pub fn cli_version(&self) -> &str {
        &self.manifest.cli_version
    }

    /// Get last update time
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.manifest.last_updated
    }

    /// Update CLI version in manifest
    pub fn update_cli_version(&mut self, version: &str) -> Result<()> {
        info!("Updating CLI version in manifest to {}", version);
        self.manifest.cli_version = version.to_string();
        self.save()
    }

    /// Check if manifest needs migration
    pub fn needs_migration(&self) -> bool {
        // Compare schema version
        self.manifest.schema_version != "1.0"
    }

    /// Get all extensions as HashMap
    pub fn extensions(&self) -> &HashMap<String, InstalledExtension> {
        &self.manifest.extensions
    }

    /// Count installed extensions
    pub fn count_installed(&self) -> usize {
        self.manifest
            .extensions
            .values()
            .filter(|ext| ext.state == ExtensionState::Installed)
            .count()
    }

    /// Clear all extensions (for reset/cleanup)
    pub fn clear_all(&mut self) -> Result<()> {
        warn!("Clearing all extensions from manifest");
        self.manifest.extensions.clear();
        self.save()
    }

    /// Export manifest to another location
    pub fn export_to(&self, path: &Path) -> Result<()> {
        Self::ensure_parent_dir(path)?;
        Self::save_manifest(path, &self.manifest)
    }

    /// Import manifest from another location
    pub fn import_from(path: &Path, destination: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow!("Import file does not exist: {:?}", path));
        }

        let manifest = Self::load_manifest(path)?;
        Self::ensure_parent_dir(&destination)?;
        Self::save_manifest(&destination, &manifest)?;

        Ok(Self {
            manifest_path: destination,
            manifest,
        })
    }

    /// Validate manifest integrity
    pub fn validate(&self) -> Result<Vec<String>> {
        let mut warnings = Vec::new();

        // Check CLI version format
        if self.manifest.cli_version.is_empty() {
            warnings.push("CLI version is empty".to_string());
        }

        // Check for invalid states
        for (name, ext) in &self.manifest.extensions {
            if ext.version.is_empty() {
                warnings.push(format!("Extension {} has empty version", name));
            }
            if ext.source.is_empty() {
                warnings.push(format!("Extension {} has empty source", name));
            }
        }

        Ok(warnings)
    }

    /// Get reference to the underlying manifest
    pub fn manifest(&self) -> &InstallManifest {
        &self.manifest
    }

    /// Get mutable reference to the underlying manifest
    pub fn manifest_mut(&mut self) -> &mut InstallManifest {
        &mut self.manifest
    }
}

impl Default for ManifestManager {
    fn default() -> Self {
        Self::load_default().expect("Failed to load default manifest")
    }
}
