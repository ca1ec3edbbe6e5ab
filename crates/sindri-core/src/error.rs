//! Error types for sindri-core

use thiserror::Error;

/// Result type alias using sindri-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Sindri
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Schema validation error
    #[error("Schema validation failed:\n{errors}")]
    SchemaValidation { errors: String },

    /// Schema not found
    #[error("Schema not found: {name}")]
    SchemaNotFound { name: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid semver version
    #[error("Invalid version format: {version}")]
    InvalidVersion { version: String },

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Invalid provider
    #[error("Unknown provider: {provider}. Valid providers: docker, fly, devpod, e2b, kubernetes")]
    InvalidProvider { provider: String },

    /// Invalid extension
    #[error("Unknown extension: {extension}")]
    InvalidExtension { extension: String },

    /// Invalid profile
    #[error("Unknown profile: {profile}")]
    InvalidProfile { profile: String },

    /// Extension conflict
    #[error("Extension conflict: {ext1} conflicts with {ext2}")]
    ExtensionConflict { ext1: String, ext2: String },

    /// Circular dependency
    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// Template rendering error
    #[error("Template error: {0}")]
    Template(String),

    /// Manifest failed to parse as YAML/JSON
    #[error("Manifest parse error: {message}")]
    ManifestParse { message: String },

    /// Manifest parsed but failed schema validation
    #[error("Manifest schema error: {message}")]
    ManifestSchema { message: String },

    /// A requested extension is not present in the registry
    #[error("Unknown extension: {name}")]
    UnknownExtension { name: String },

    /// A declared dependency does not resolve to a known extension
    #[error("Unknown dependency: {name}")]
    UnknownDependency { name: String },

    /// A dependency cycle was found during resolution
    #[error("Dependency cycle: {}", chain.join(" -> "))]
    DependencyCycle { chain: Vec<String> },

    /// Two extensions in the same resolved set declare each other as conflicts
    #[error("Conflicting extensions: {a} conflicts with {b}")]
    ConflictingExtensions { a: String, b: String },

    /// A critical domain requirement failed to resolve
    #[error("DNS validation failed for domain: {domain}")]
    DnsValidation { domain: String },

    /// The operation was throttled by the rate limiter
    #[error("Rate limited: {bucket} ({count} operations in the current window)")]
    RateLimited { bucket: String, count: u32 },

    /// A required credential is absent
    #[error("Missing credential for provider: {provider}")]
    AuthMissing { provider: String },

    /// A credential or auth validator check failed
    #[error("Invalid credential for provider: {provider}")]
    AuthInvalid { provider: String },

    /// Installation of an extension failed
    #[error("Install failed for {extension}: {message}")]
    InstallFailed { extension: String, message: String },

    /// An install step exceeded its deadline
    #[error("Install timed out for {extension} after {seconds}s")]
    InstallTimeout { extension: String, seconds: u64 },

    /// A downloaded artifact's digest did not match the declared integrity value
    #[error("Checksum mismatch for {name}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// A resolved path escaped its confinement boundary
    #[error("Path escape: {path}")]
    PathEscape { path: String },

    /// An executed command returned a non-zero, non-conditional exit code
    #[error("Command failed: {command} (exit {exit_code})")]
    CommandFailed { command: String, exit_code: i32 },

    /// Post-init validation did not match the expected exit code/pattern
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    /// A collision scenario resolved to a stop/skip outcome that aborted the caller
    #[error("Collision unresolved for {extension}: {message}")]
    CollisionUnresolved { extension: String, message: String },

    /// A conflict-rule merge (json/yaml) could not be applied
    #[error("Merge failed for {path}: {message}")]
    MergeFailed { path: String, message: String },

    /// The manifest/state store is corrupt or internally inconsistent
    #[error("State store corrupt: {message}")]
    StateCorrupt { message: String },
}

/// Maps an error to the CLI exit-code contract (§6): 0 success, 1 generic,
/// 2 usage, 3 dependency/conflict, 4 DNS/network, 5 auth, 6 rate-limited.
impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::UnknownExtension { .. }
            | Error::UnknownDependency { .. }
            | Error::DependencyCycle { .. }
            | Error::ConflictingExtensions { .. }
            | Error::CircularDependency { .. }
            | Error::ExtensionConflict { .. } => 3,
            Error::DnsValidation { .. } => 4,
            Error::AuthMissing { .. } | Error::AuthInvalid { .. } => 5,
            Error::RateLimited { .. } => 6,
            Error::InvalidConfig { .. } | Error::MissingField { .. } => 2,
            _ => 1,
        }
    }
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a schema validation error from a list of errors
    pub fn schema_validation(errors: Vec<String>) -> Self {
        Self::SchemaValidation {
            errors: errors.join("\n"),
        }
    }

    /// Create a schema not found error
    pub fn schema_not_found(name: impl Into<String>) -> Self {
        Self::SchemaNotFound { name: name.into() }
    }

    /// Create an invalid version error
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid provider error
    pub fn invalid_provider(provider: impl Into<String>) -> Self {
        Self::InvalidProvider {
            provider: provider.into(),
        }
    }

    /// Create an invalid extension error
    pub fn invalid_extension(extension: impl Into<String>) -> Self {
        Self::InvalidExtension {
            extension: extension.into(),
        }
    }

    /// Create an invalid profile error
    pub fn invalid_profile(profile: impl Into<String>) -> Self {
        Self::InvalidProfile {
            profile: profile.into(),
        }
    }

    /// Create an extension conflict error
    pub fn extension_conflict(ext1: impl Into<String>, ext2: impl Into<String>) -> Self {
        Self::ExtensionConflict {
            ext1: ext1.into(),
            ext2: ext2.into(),
        }
    }

    /// Create a circular dependency error
    pub fn circular_dependency(cycle: impl Into<String>) -> Self {
        Self::CircularDependency {
            cycle: cycle.into(),
        }
    }

    /// Create an unknown extension error
    pub fn unknown_extension(name: impl Into<String>) -> Self {
        Self::UnknownExtension { name: name.into() }
    }

    /// Create an unknown dependency error
    pub fn unknown_dependency(name: impl Into<String>) -> Self {
        Self::UnknownDependency { name: name.into() }
    }

    /// Create a dependency cycle error with the full back-edge chain
    pub fn dependency_cycle(chain: Vec<String>) -> Self {
        Self::DependencyCycle { chain }
    }

    /// Create a conflicting extensions error
    pub fn conflicting_extensions(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::ConflictingExtensions {
            a: a.into(),
            b: b.into(),
        }
    }

    /// Create a path escape error
    pub fn path_escape(path: impl Into<String>) -> Self {
        Self::PathEscape { path: path.into() }
    }

    /// Create a DNS validation error
    pub fn dns_validation(domain: impl Into<String>) -> Self {
        Self::DnsValidation {
            domain: domain.into(),
        }
    }

    /// Create a rate-limited error
    pub fn rate_limited(bucket: impl Into<String>, count: u32) -> Self {
        Self::RateLimited {
            bucket: bucket.into(),
            count,
        }
    }

    /// Create an install failed error
    pub fn install_failed(extension: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InstallFailed {
            extension: extension.into(),
            message: message.into(),
        }
    }
}
