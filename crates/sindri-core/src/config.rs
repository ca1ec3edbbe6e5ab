//! Engine configuration: environment-variable overrides for the extension
//! engine's ambient behaviour (extension discovery root, conflict handling,
//! verbosity). There is no deployment/provider configuration here — that is
//! an external collaborator of this engine, not a module of it.

use crate::types::ConflictActionType;
use std::path::PathBuf;

/// Resolved engine configuration, built from defaults overlaid with
/// `EXTENSION_*`/`DEBUG`/`CI_MODE`/`VERBOSE`/`EXTENSIONS_DIR`/`DOCKER_LIB`
/// environment variables.
#[derive(Debug, Clone)]
pub struct SindriConfig {
    /// Root directory extension manifests are discovered from.
    pub extensions_dir: PathBuf,

    /// Installation root used by script/binary installers (`DOCKER_LIB`).
    pub install_root: Option<PathBuf>,

    /// Forces this action for every file-level collision, overriding each
    /// extension's own `collision-handling` merge strategy.
    pub conflict_strategy_override: Option<ConflictActionType>,

    /// When `false`, any `prompt` collision action is treated as `skip`.
    pub conflict_prompt_enabled: bool,

    /// Verbose/debug logging requested via `DEBUG` or `VERBOSE`.
    pub debug: bool,

    /// Running under a CI system (`CI_MODE`): disables interactive prompts.
    pub ci_mode: bool,
}

impl SindriConfig {
    /// Build configuration from defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::defaults();
        config.apply_env_overrides();
        config
    }

    fn defaults() -> Self {
        let extensions_dir = crate::utils::get_home_dir()
            .map(|home| home.join(".sindri").join("extensions"))
            .unwrap_or_else(|_| PathBuf::from(".sindri/extensions"));

        Self {
            extensions_dir,
            install_root: None,
            conflict_strategy_override: None,
            conflict_prompt_enabled: true,
            debug: false,
            ci_mode: false,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("EXTENSIONS_DIR") {
            self.extensions_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("DOCKER_LIB") {
            self.install_root = Some(PathBuf::from(val));
        }

        if let Ok(val) = std::env::var("EXTENSION_CONFLICT_STRATEGY") {
            self.conflict_strategy_override = parse_conflict_strategy(&val);
        }

        if let Ok(val) = std::env::var("EXTENSION_CONFLICT_PROMPT") {
            self.conflict_prompt_enabled = val.parse().unwrap_or(true);
        }

        self.debug = env_flag("DEBUG") || env_flag("VERBOSE");
        self.ci_mode = env_flag("CI_MODE");
    }

    /// Rewrite a `prompt` collision action to `skip` when prompting is
    /// disabled (non-interactive run or `EXTENSION_CONFLICT_PROMPT=false`).
    pub fn resolve_conflict_action(&self, declared: ConflictActionType) -> ConflictActionType {
        if let Some(forced) = self.conflict_strategy_override {
            return forced;
        }
        if matches!(declared, ConflictActionType::Prompt | ConflictActionType::PromptPerFile)
            && !self.conflict_prompt_enabled
        {
            return ConflictActionType::Skip;
        }
        declared
    }
}

fn parse_conflict_strategy(value: &str) -> Option<ConflictActionType> {
    match value.to_ascii_lowercase().as_str() {
        "overwrite" => Some(ConflictActionType::Overwrite),
        "append" => Some(ConflictActionType::Append),
        "prepend" => Some(ConflictActionType::Prepend),
        "merge-json" => Some(ConflictActionType::MergeJson),
        "merge-yaml" => Some(ConflictActionType::MergeYaml),
        "backup" => Some(ConflictActionType::Backup),
        "backup-and-replace" => Some(ConflictActionType::BackupAndReplace),
        "merge" => Some(ConflictActionType::Merge),
        "prompt" => Some(ConflictActionType::Prompt),
        "prompt-per-file" => Some(ConflictActionType::PromptPerFile),
        "skip" => Some(ConflictActionType::Skip),
        _ => None,
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl Default for SindriConfig {
    fn default() -> Self {
        Self::defaults()
    }
}
