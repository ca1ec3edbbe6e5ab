// Condition evaluation for environment-based template selection

use anyhow::{Context, Result};
use regex::Regex;
use sindri_core::types::{
    EnvCondition, EnvConditionExpr, EnvConditionLogical, PlatformCondition, TemplateCondition,
};
use std::collections::HashMap;

/// Platform information for condition evaluation
#[derive(Debug, Clone)]
struct PlatformInfo {
    os: String,   // "linux", "macos", "windows"
    arch: String, // "x86_64", "aarch64", "arm64"
}

impl PlatformInfo {
    /// Detect current platform information
    fn detect() -> Self {
        let os = match std::env::consts::OS {
            "linux" => "linux",
            "macos" => "macos",
            "windows" => "windows",
            other => {
                tracing::warn!("Unknown OS: {}, defaulting to 'unknown'", other);
                "unknown"
            }
        };

        let arch = match std::env::consts::ARCH {
            "x86_64" => "x86_64",
            "aarch64" => "aarch64",
            "arm" => "arm64",
            other => {
                tracing::warn!("Unknown architecture: {}, defaulting to 'unknown'", other);
                "unknown"
            }
        };

        Self {
            os: os.to_string(),
            arch: arch.to_string(),
        }
    }
}

/// Condition evaluator for template selection
pub struct ConditionEvaluator {
    platform_info: PlatformInfo,
}

impl ConditionEvaluator {
    /// Create a new condition evaluator
    pub fn new() -> Self {
        Self {
            platform_info: PlatformInfo::detect(),
        }
    }

    /// Evaluate a template condition
    pub fn evaluate(&self, condition: &TemplateCondition) -> Result<bool> {
        // Evaluate env conditions
        if let Some(env_cond) = &condition.env {
            if !self.evaluate_env_condition(env_cond)? {
                return Ok(false);
            }
        }

        // Evaluate platform conditions
        if let Some(platform_cond) = &condition.platform {
            if !self.evaluate_platform_condition(platform_cond)? {
                return Ok(false);
            }
        }

        // Evaluate logical operators
        if let Some(any_conditions) = &condition.any {
            return self.evaluate_any(any_conditions);
        }

        if let Some(all_conditions) = &condition.all {
            return self.evaluate_all(all_conditions);
        }

        if let Some(not_condition) = &condition.not {
            return Ok(!self.evaluate(not_condition)?);
        }

        Ok(true)
    }

    /// Evaluate environment variable condition
    fn evaluate_env_condition(&self, env_cond: &EnvCondition) -> Result<bool> {
        match env_cond {
            EnvCondition::Simple(map) => {
                // Simple key-value matching: { CI: "true" }
                for (key, expected_value) in map {
                    let actual_value = self.get_env_var(key);
                    if actual_value.as_deref() != Some(expected_value.as_str()) {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            EnvCondition::Complex(map) => {
                // Complex with operators: { CI: { equals: "true" } }
                for (key, expr) in map {
                    if !self.evaluate_env_expr(key, expr)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            EnvCondition::Logical(logical) => {
                // Logical operators: { any: [...], all: [...], not_any: [...] }
                self.evaluate_env_logical(logical)
            }
        }
    }

    /// Evaluate environment variable expression
    fn evaluate_env_expr(&self, key: &str, expr: &EnvConditionExpr) -> Result<bool> {
        let actual_value = self.get_env_var(key);

        // Check exists condition
        if let Some(should_exist) = expr.exists {
            return Ok(actual_value.is_some() == should_exist);
        }

        // For other operators, we need a value
        let value = match actual_value {
            Some(v) => v,
            None => return Ok(false), // Variable doesn't exist
        };

        // Check equals
        if let Some(expected) = &expr.equals {
            if value != *expected {
                return Ok(false);
            }
        }

        // Check not_equals
        if let Some(not_expected) = &expr.not_equals {
            if value == *not_expected {
                return Ok(false);
            }
        }

        // Check regex match
        if let Some(pattern) = &expr.matches {
            let regex = Regex::new(pattern)
                .with_context(|| format!("Invalid regex pattern: {}", pattern))?;
            if !regex.is_match(&value) {
                return Ok(false);
            }
        }

        // Check in_list
        if let Some(list) = &expr.in_list {
            if !list.contains(&value) {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Evaluate logical environment conditions
    fn evaluate_env_logical(&self, logical: &EnvConditionLogical) -> Result<bool> {
        // Check any (OR logic)
        if let Some(any_conditions) = &logical.any {
            for condition_map in any_conditions {
                if self.evaluate_simple_env_map(condition_map) {
                    return Ok(true);
                }
            }
            return Ok(false);
        }

        // Check all (AND logic)
        if let Some(all_conditions) = &logical.all {
            for condition_map in all_conditions {
                if !self.evaluate_simple_env_map(condition_map) {
                    return Ok(false);
                }
            }
            return Ok(true);
        }

        // Check not_any (NOR logic)
        if let Some(not_any_conditions) = &logical.not_any {
            for condition_map in not_any_conditions {
                if self.evaluate_simple_env_map(condition_map) {
                    return Ok(false);
                }
            }
            return Ok(true);
        }

        // Check not_all (NAND logic)
        if let Some(not_all_conditions) = &logical.not_all {
            for condition_map in not_all_conditions {
                if !self.evaluate_simple_env_map(condition_map) {
                    return Ok(true);
                }
            }
            return Ok(false);
        }

        Ok(true)
    }

    /// Evaluate simple environment variable map (key-value pairs)
    fn evaluate_simple_env_map(&self, map: &HashMap<String, String>) -> bool {
        for (key, expected_value) in map {
            let actual_value = self.get_env_var(key);
            if actual_value.as_deref() != Some(expected_value.as_str()) {
                return false;
            }
        }
        true
    }

    /// Evaluate platform condition
    fn evaluate_platform_condition(&self, platform: &PlatformCondition) -> Result<bool> {
        // Check OS
        if let Some(allowed_os) = &platform.os {
            if !allowed_os.contains(&self.platform_info.os) {
                return Ok(false);
            }
        }

        // Check architecture
        if let Some(allowed_arch) = &platform.arch {
            if !allowed_arch.contains(&self.platform_info.arch) {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Evaluate any (OR) conditions
    fn evaluate_any(&self, conditions: &[TemplateCondition]) -> Result<bool> {
        for condition in conditions {
            if self.evaluate(condition)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Evaluate all (AND) conditions
    fn evaluate_all(&self, conditions: &[TemplateCondition]) -> Result<bool> {
        for condition in conditions {
            if !self.evaluate(condition)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Get environment variable value
    fn get_env_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Default for ConditionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
