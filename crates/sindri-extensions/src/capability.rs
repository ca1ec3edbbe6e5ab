//! Typed accessors over an extension's `capabilities.*` block.
//!
//! This is a thin, stateless reader: every method returns the capability
//! sub-record or treats it as absent. The YAML scalar `null` already
//! deserializes to `None` for every `Option<T>` field below, so "absent"
//! and "explicitly null" are indistinguishable by the time we see it here,
//! matching the sentinel semantics the spec calls for.

use sindri_core::types::{
    AuthCapability, CapabilitiesConfig, CollisionHandlingConfig, Extension, HooksCapability,
    McpCapability, ProjectContextCapability, ProjectInitCapability,
};

/// Read-only view over one extension's capability bundle.
pub struct CapabilityReader<'a> {
    capabilities: Option<&'a CapabilitiesConfig>,
}

impl<'a> CapabilityReader<'a> {
    pub fn new(extension: &'a Extension) -> Self {
        Self {
            capabilities: extension.capabilities.as_ref(),
        }
    }

    pub fn project_init(&self) -> Option<&'a ProjectInitCapability> {
        self.capabilities?.project_init.as_ref()
    }

    pub fn auth(&self) -> Option<&'a AuthCapability> {
        self.capabilities?.auth.as_ref()
    }

    pub fn hooks(&self) -> Option<&'a HooksCapability> {
        self.capabilities?.hooks.as_ref()
    }

    pub fn mcp(&self) -> Option<&'a McpCapability> {
        self.capabilities?.mcp.as_ref()
    }

    pub fn collision_handling(&self) -> Option<&'a CollisionHandlingConfig> {
        self.capabilities?.collision_handling.as_ref()
    }

    pub fn project_context(&self) -> Option<&'a ProjectContextCapability> {
        self.capabilities?.project_context.as_ref()
    }

    /// Whether the named capability is enabled. For capabilities without an
    /// explicit `enabled` flag (`auth`, `project-context` in the schema's
    /// looser sense, `hooks`), presence of the required sub-fields counts
    /// as enabled instead.
    pub fn is_enabled(&self, kind: &str) -> bool {
        match kind {
            "project-init" => self.project_init().is_some_and(|c| c.enabled),
            "auth" => self.auth().is_some(),
            "hooks" => self.hooks().is_some_and(|h| {
                h.pre_install.is_some()
                    || h.post_install.is_some()
                    || h.pre_project_init.is_some()
                    || h.post_project_init.is_some()
            }),
            "mcp" => self.mcp().is_some_and(|c| c.enabled),
            "collision-handling" => self.collision_handling().is_some_and(|c| c.enabled),
            "project-context" => self.project_context().is_some_and(|c| c.enabled),
            _ => false,
        }
    }
}
