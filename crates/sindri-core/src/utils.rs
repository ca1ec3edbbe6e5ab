//! Shared utility functions for Sindri crates

use anyhow::anyhow;
use std::path::PathBuf;

/// Extension/profile name shape shared by the registry loader (C1), the
/// installation executor's apt keyring/sources filenames (C4), and every
/// write to the state store (C10). Centralised so the three call sites can
/// never drift apart.
pub fn is_valid_extension_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}


/// Get the user's home directory
///
/// Prefers the HOME environment variable over dirs::home_dir() because:
/// - In Docker containers with volume mounts, HOME may be set to ALT_HOME
/// - dirs::home_dir() reads from /etc/passwd which doesn't respect env overrides
/// - Shell scripts use $HOME, so we need consistency with bootstrap/entrypoint
pub fn get_home_dir() -> anyhow::Result<PathBuf> {
    // First check HOME environment variable (respects Docker ALT_HOME setup)
    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home));
    }

    // Fallback to dirs::home_dir() for non-container environments
    dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))
}
