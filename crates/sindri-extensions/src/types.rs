//! Extension types re-exported for sindri-extensions
//!
//! This module re-exports extension types from sindri-core for convenience
//! and adds extension-specific type utilities.

// Re-export all extension types from sindri-core
pub use sindri_core::types::{
    AdvancedFeatures,
    AptInstallConfig,
    AptRemoveConfig,
    AptRepository,
    AptUpgradeConfig,

    AuthCapability,
    AuthFeature,
    AuthMethod,
    AuthProvider,
    AuthValidator,
    BinaryDownload,
    BinaryInstallConfig,
    // Bill of Materials
    BomConfig,
    BomFile,
    BomFileType,
    BomSource,
    BomTool,
    BomToolType,
    // Capabilities
    CapabilitiesConfig,
    Checksum,
    ChecksumAlgorithm,
    CollisionHandlingConfig,
    CollisionScenario,
    CommandValidation,
    // Configuration phase
    ConfigureConfig,
    ConflictActionType,
    ConflictResourceType,
    ConflictRule,
    CoreFeatures,
    DetectionMethod,
    DownloadSource,
    DownloadSourceType,
    EnvironmentConfig,
    EnvironmentScope,

    // Core extension types
    Extension,
    ExtensionCategory,
    ExtensionMetadata,
    ExtensionRequirements,
    FeaturesConfig,
    GpuRequirementType,

    GpuRequirements,
    HookConfig,
    HooksCapability,
    // Installation configuration
    InstallConfig,
    InstallMethod,
    LlmFeatures,
    McpCapability,
    McpFeatures,
    McpServerConfig,
    McpTool,
    MergeFileConfig,
    MergeStrategy,
    MiseInstallConfig,
    MiseRemoveConfig,
    MiseUpgradeConfig,
    MiseValidation,

    NpmInstallConfig,
    OnConflictAction,
    ProjectContextCapability,
    ProjectInitCapability,
    ProjectInitCommand,
    ProjectInitValidation,
    // Removal
    RemoveConfig,
    ScenarioAction,
    ScenarioOption,

    ScriptConfig,

    ScriptRemoveConfig,

    StateMarker,
    StateMarkerType,
    SwarmFeatures,
    TemplateConfig,
    TemplateMode,
    // Upgrade
    UpgradeConfig,
    UpgradeStrategy,
    // Validation
    ValidateConfig,
    VersionDetection,
    VersionMarker,
};

// Re-export registry types that extensions use
pub use sindri_core::types::{Profile, RegistryEntry};
