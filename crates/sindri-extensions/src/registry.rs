//! Extension registry management
//!
//! Extensions are discovered from a local filesystem tree only: a
//! `registry.yaml` enumerating the authoritative set plus per-extension
//! `extension.yaml` manifests loaded on demand. There is no remote registry.

use anyhow::{anyhow, Context, Result};
use sindri_core::types::{
    Extension, ExtensionRegistry as RegistryFile, Profile, ProfilesFile, RegistryEntry,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Maximum manifest file size accepted by the loader (10 MiB).
pub const MAX_MANIFEST_BYTES: u64 = 10 * 1024 * 1024;

/// Time budget for parsing a single manifest, guarding against expansion attacks.
pub const MANIFEST_PARSE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

use sindri_core::utils::is_valid_extension_name as is_valid_name;

/// Extension registry with loaded extensions and profiles
pub struct ExtensionRegistry {
    /// Registry entries
    pub entries: HashMap<String, RegistryEntry>,

    /// Available profiles
    pub profiles: HashMap<String, Profile>,

    /// Loaded extension definitions
    pub extensions: HashMap<String, Extension>,

    /// Root directory extensions were loaded from, if any
    extensions_root: Option<PathBuf>,
}

impl ExtensionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            profiles: HashMap::new(),
            extensions: HashMap::new(),
            extensions_root: None,
        }
    }

    /// Load registry metadata (registry.yaml, profiles.yaml) from local files.
    pub fn load_local(registry_path: &Path, profiles_path: &Path) -> Result<Self> {
        debug!(
            "Loading registry from local files: {:?}, {:?}",
            registry_path, profiles_path
        );

        let registry_content = std::fs::read_to_string(registry_path)?;
        let registry: RegistryFile = serde_yaml_ng::from_str(&registry_content)?;

        for name in registry.extensions.keys() {
            if !is_valid_name(name) {
                return Err(anyhow!(
                    "registry entry '{}' fails name validation (^[a-z0-9-]+$)",
                    name
                ));
            }
        }

        let profiles_content = std::fs::read_to_string(profiles_path)?;
        let profiles: ProfilesFile = serde_yaml_ng::from_str(&profiles_content)?;

        info!(
            "Loaded {} extensions and {} profiles from local files",
            registry.extensions.len(),
            profiles.profiles.len()
        );

        Ok(Self {
            entries: registry.extensions,
            profiles: profiles.profiles,
            extensions: HashMap::new(),
            extensions_root: None,
        })
    }

    /// Walk `root` and load every `<name>/extension.yaml` it contains.
    ///
    /// Each manifest is parsed independently; a failure is collected rather
    /// than aborting the whole load, matching C1's `LoadAll` contract.
    pub fn load_all(&mut self, root: &Path) -> Result<Vec<(String, anyhow::Error)>> {
        self.extensions_root = Some(root.to_path_buf());
        let mut errors = Vec::new();

        if !root.is_dir() {
            return Ok(errors);
        }

        let mut seen_names = std::collections::HashSet::new();

        for entry in std::fs::read_dir(root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let dir_name = entry.file_name().to_string_lossy().to_string();
            let manifest_path = entry.path().join("extension.yaml");
            if !manifest_path.exists() {
                continue;
            }

            match self.load_extension_file(&dir_name, &manifest_path) {
                Ok(name) => {
                    if !seen_names.insert(name.clone()) {
                        errors.push((
                            name.clone(),
                            anyhow!("duplicate extension name: {}", name),
                        ));
                    }
                }
                Err(e) => errors.push((dir_name, e)),
            }
        }

        Ok(errors)
    }

    /// Load and validate a single extension manifest file, returning its name.
    fn load_extension_file(&mut self, dir_name: &str, path: &Path) -> Result<String> {
        let metadata = std::fs::metadata(path)?;
        if metadata.len() > MAX_MANIFEST_BYTES {
            return Err(anyhow!(
                "manifest {:?} exceeds {} byte limit",
                path,
                MAX_MANIFEST_BYTES
            ));
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading manifest {:?}", path))?;

        let extension: Extension = parse_with_deadline(&content)?;

        if !is_valid_name(&extension.metadata.name) {
            return Err(anyhow!(
                "extension name '{}' fails name validation (^[a-z0-9-]+$)",
                extension.metadata.name
            ));
        }

        if extension.metadata.name != dir_name {
            debug!(
                "extension directory '{}' contains manifest for '{}'",
                dir_name, extension.metadata.name
            );
        }

        let name = extension.metadata.name.clone();
        self.extensions.insert(name.clone(), extension);
        Ok(name)
    }

    /// Load a single extension definition from an explicit path (used by
    /// callers that already know the file location, e.g. `install --file`).
    pub fn load_extension(&mut self, name: &str, extension_path: &Path) -> Result<()> {
        let loaded = self.load_extension_file(name, extension_path)?;
        if loaded != name {
            return Err(anyhow!(
                "extension name mismatch: file says '{}' but expected '{}'",
                loaded,
                name
            ));
        }
        Ok(())
    }

    /// Directory every extension was discovered under, if `load_all` ran.
    pub fn extensions_root(&self) -> Option<&Path> {
        self.extensions_root.as_deref()
    }

    /// Get extension entry by name
    pub fn get_entry(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    /// Get loaded extension definition
    pub fn get_extension(&self, name: &str) -> Option<&Extension> {
        self.extensions.get(name)
    }

    /// Get profile by name
    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// List all extension names
    pub fn list_extensions(&self) -> Vec<&str> {
        self.entries.keys().map(|s| s.as_str()).collect()
    }

    /// List all profile names
    pub fn list_profiles(&self) -> Vec<&str> {
        self.profiles.keys().map(|s| s.as_str()).collect()
    }

    /// Get extensions for a profile
    pub fn get_profile_extensions(&self, profile_name: &str) -> Result<Vec<String>> {
        let profile = self
            .profiles
            .get(profile_name)
            .ok_or_else(|| anyhow!("Unknown profile: {}", profile_name))?;

        Ok(profile.extensions.clone())
    }

    /// Check if an extension exists
    pub fn has_extension(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Check if a profile exists
    pub fn has_profile(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Get dependencies for an extension
    pub fn get_dependencies(&self, name: &str) -> Vec<String> {
        self.entries
            .get(name)
            .map(|e| e.dependencies.clone())
            .unwrap_or_default()
    }

    /// Get conflicts for an extension
    pub fn get_conflicts(&self, name: &str) -> Vec<String> {
        self.entries
            .get(name)
            .map(|e| e.conflicts.clone())
            .unwrap_or_default()
    }

    /// Check if extension is protected
    pub fn is_protected(&self, name: &str) -> bool {
        self.entries.get(name).map(|e| e.protected).unwrap_or(false)
    }

    /// Filter extensions by category
    pub fn list_by_category(&self, category: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.category == category)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Get all categories
    pub fn list_categories(&self) -> Vec<String> {
        let mut categories: Vec<_> = self.entries.values().map(|e| e.category.clone()).collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Search extensions by name or description
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query_lower = query.to_lowercase();
        self.entries
            .iter()
            .filter(|(name, entry)| {
                name.to_lowercase().contains(&query_lower)
                    || entry.description.to_lowercase().contains(&query_lower)
            })
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Get an iterator over loaded extensions
    pub fn extensions(&self) -> impl Iterator<Item = (&String, &Extension)> {
        self.extensions.iter()
    }

    /// Extensions whose named capability is enabled, ordered by the
    /// capability's `priority` (ascending, default 100) then by name.
    pub fn discover(&self, capability: &str) -> Vec<&str> {
        let mut matches: Vec<(u32, &str)> = self
            .extensions
            .iter()
            .filter_map(|(name, ext)| {
                let caps = ext.capabilities.as_ref()?;
                let priority: u32 = match capability {
                    "project-init" => caps.project_init.as_ref().filter(|c| c.enabled)?.priority,
                    "hooks" => {
                        let h = caps.hooks.as_ref()?;
                        if h.pre_install.is_none()
                            && h.post_install.is_none()
                            && h.pre_project_init.is_none()
                            && h.post_project_init.is_none()
                        {
                            return None;
                        }
                        100
                    }
                    "mcp" => {
                        caps.mcp.as_ref().filter(|c| c.enabled)?;
                        100
                    }
                    "auth" => {
                        caps.auth.as_ref()?;
                        100
                    }
                    "collision-handling" => {
                        caps.collision_handling.as_ref().filter(|c| c.enabled)?;
                        100
                    }
                    "project-context" => {
                        caps.project_context.as_ref().filter(|c| c.enabled)?;
                        100
                    }
                    _ => return None,
                };
                Some((priority, name.as_str()))
            })
            .collect();

        matches.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
        matches.into_iter().map(|(_, n)| n).collect()
    }
}

/// Parse a manifest with a wall-clock deadline, guarding against maliciously
/// expansive YAML (anchor/alias bombs). The parse itself is synchronous and
/// CPU-bound, so the deadline is enforced by running it on a scoped thread.
fn parse_with_deadline(content: &str) -> Result<Extension> {
    let (tx, rx) = std::sync::mpsc::channel();
    let owned = content.to_string();
    std::thread::spawn(move || {
        let result = serde_yaml_ng::from_str::<Extension>(&owned).map_err(|e| anyhow!(e));
        let _ = tx.send(result);
    });

    match rx.recv_timeout(MANIFEST_PARSE_TIMEOUT) {
        Ok(result) => result,
        Err(_) => Err(anyhow!(
            "manifest parsing exceeded {:?} budget",
            MANIFEST_PARSE_TIMEOUT
        )),
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
