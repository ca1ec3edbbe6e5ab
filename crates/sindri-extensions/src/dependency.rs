//! Dependency resolution: closure, conflict check, cycle detection, and a
//! deterministic topological order with protected extensions pinned first.

use sindri_core::error::Error as CoreError;
use std::collections::{HashMap, HashSet};

use crate::registry::ExtensionRegistry;

/// One extension's place in a resolved set, with the reason it was included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    Requested,
    TransitiveOf(String),
}

/// A fully resolved, ordered installation/removal plan.
#[derive(Debug, Clone, Default)]
pub struct ResolvedPlan {
    pub order: Vec<String>,
    pub reasons: HashMap<String, Reason>,
}

/// Dependency resolver operating over a registry's dependency/conflict/protected
/// declarations and each extension's project-init priority (used for tie-breaks).
pub struct DependencyResolver {
    dependencies: HashMap<String, Vec<String>>,
    conflicts: HashMap<String, Vec<String>>,
    protected: HashSet<String>,
    priorities: HashMap<String, u32>,
}

impl DependencyResolver {
    /// Build a resolver from an extension registry's entries.
    pub fn new(registry: &ExtensionRegistry) -> Self {
        let mut dependencies = HashMap::new();
        let mut conflicts = HashMap::new();
        let mut protected = HashSet::new();

        for name in registry.list_extensions() {
            dependencies.insert(name.to_string(), registry.get_dependencies(name));
            conflicts.insert(name.to_string(), registry.get_conflicts(name));
            if registry.is_protected(name) {
                protected.insert(name.to_string());
            }
        }

        let mut priorities = HashMap::new();
        for (name, ext) in registry.extensions() {
            if let Some(priority) = ext
                .capabilities
                .as_ref()
                .and_then(|c| c.project_init.as_ref())
                .map(|p| p.priority)
            {
                priorities.insert(name.clone(), priority);
            }
        }

        Self {
            dependencies,
            conflicts,
            protected,
            priorities,
        }
    }

    fn priority_of(&self, name: &str) -> u32 {
        *self.priorities.get(name).unwrap_or(&100)
    }

    /// Resolve an install plan for `requested` names, reversing edges when
    /// `reverse` is true (used for removal: dependents before dependencies).
    pub fn resolve_many(&self, requested: &[String], reverse: bool) -> Result<ResolvedPlan, CoreError> {
        let (closure, reasons) = self.closure(requested)?;
        self.check_conflicts(&closure)?;

        let edges = if reverse {
            self.reversed_edges(&closure)
        } else {
            self.dependencies.clone()
        };

        let mut order = self.topological_order(&closure, &edges)?;
        self.apply_protected_first(&mut order);

        Ok(ResolvedPlan { order, reasons })
    }

    /// Convenience wrapper matching the legacy single-extension API: resolve
    /// `extension` and everything it transitively depends on, in install order.
    pub fn resolve(&self, extension: &str) -> Result<Vec<String>, CoreError> {
        Ok(self.resolve_many(&[extension.to_string()], false)?.order)
    }

    /// *Closure*: transitively include every declared dependency, failing on
    /// a reference to an unknown extension.
    fn closure(
        &self,
        requested: &[String],
    ) -> Result<(HashSet<String>, HashMap<String, Reason>), CoreError> {
        let mut closure = HashSet::new();
        let mut reasons = HashMap::new();
        let mut stack: Vec<(String, Reason)> = requested
            .iter()
            .map(|n| (n.clone(), Reason::Requested))
            .collect();

        while let Some((name, reason)) = stack.pop() {
            if closure.contains(&name) {
                continue;
            }
            if !self.dependencies.contains_key(&name) {
                return Err(CoreError::unknown_dependency(name));
            }
            closure.insert(name.clone());
            reasons.insert(name.clone(), reason);

            for dep in self.dependencies.get(&name).cloned().unwrap_or_default() {
                if !self.dependencies.contains_key(&dep) {
                    return Err(CoreError::unknown_dependency(dep));
                }
                if !closure.contains(&dep) {
                    stack.push((dep, Reason::TransitiveOf(name.clone())));
                }
            }
        }

        Ok((closure, reasons))
    }

    /// *Conflict check*: no two extensions in the closure may declare each other.
    fn check_conflicts(&self, closure: &HashSet<String>) -> Result<(), CoreError> {
        let mut names: Vec<&String> = closure.iter().collect();
        names.sort();

        for (i, a) in names.iter().enumerate() {
            let conflicts_of_a = self.conflicts.get(*a).cloned().unwrap_or_default();
            for b in &names[i + 1..] {
                let conflicts_of_b = self.conflicts.get(*b).cloned().unwrap_or_default();
                if conflicts_of_a.contains(*b) || conflicts_of_b.contains(*a) {
                    return Err(CoreError::conflicting_extensions((*a).clone(), (*b).clone()));
                }
            }
        }

        Ok(())
    }

    fn reversed_edges(&self, closure: &HashSet<String>) -> HashMap<String, Vec<String>> {
        let mut reversed: HashMap<String, Vec<String>> =
            closure.iter().map(|n| (n.clone(), Vec::new())).collect();

        for name in closure {
            for dep in self.dependencies.get(name).cloned().unwrap_or_default() {
                if closure.contains(&dep) {
                    reversed.entry(dep).or_default().push(name.clone());
                }
            }
        }

        reversed
    }

    /// *Cycle detection* + *topological order* in one DFS pass. Ties among
    /// extensions with no ordering constraint between them are broken by
    /// ascending priority then name, for deterministic output.
    fn topological_order(
        &self,
        closure: &HashSet<String>,
        edges: &HashMap<String, Vec<String>>,
    ) -> Result<Vec<String>, CoreError> {
        let mut ordered = Vec::new();
        let mut visited = HashSet::new();
        let mut on_stack = Vec::new();
        let mut in_progress = HashSet::new();

        let mut names: Vec<&String> = closure.iter().collect();
        names.sort_by(|a, b| self.priority_of(a).cmp(&self.priority_of(b)).then_with(|| a.cmp(b)));

        for name in names {
            self.visit(
                name,
                edges,
                &mut ordered,
                &mut visited,
                &mut in_progress,
                &mut on_stack,
            )?;
        }

        Ok(ordered)
    }

    #[allow(clippy::too_many_arguments)]
    fn visit(
        &self,
        name: &str,
        edges: &HashMap<String, Vec<String>>,
        ordered: &mut Vec<String>,
        visited: &mut HashSet<String>,
        in_progress: &mut HashSet<String>,
        on_stack: &mut Vec<String>,
    ) -> Result<(), CoreError> {
        if visited.contains(name) {
            return Ok(());
        }
        if in_progress.contains(name) {
            let mut chain = on_stack.clone();
            chain.push(name.to_string());
            let start = chain.iter().position(|n| n == name).unwrap_or(0);
            return Err(CoreError::dependency_cycle(chain[start..].to_vec()));
        }

        in_progress.insert(name.to_string());
        on_stack.push(name.to_string());

        let mut deps = edges.get(name).cloned().unwrap_or_default();
        deps.sort_by(|a, b| self.priority_of(a).cmp(&self.priority_of(b)).then_with(|| a.cmp(b)));

        for dep in deps {
            self.visit(&dep, edges, ordered, visited, in_progress, on_stack)?;
        }

        on_stack.pop();
        in_progress.remove(name);
        visited.insert(name.to_string());
        ordered.push(name.to_string());

        Ok(())
    }

    /// *Protected-first rule*: pull the (dependency-free) protected
    /// extensions to the front, preserving the rest of the order.
    fn apply_protected_first(&self, order: &mut Vec<String>) {
        if self.protected.is_empty() {
            return;
        }
        let mut protected: Vec<String> = order
            .iter()
            .filter(|n| self.protected.contains(*n))
            .cloned()
            .collect();
        protected.sort();
        order.retain(|n| !self.protected.contains(n));
        let rest = std::mem::take(order);
        *order = protected.into_iter().chain(rest).collect();
    }

    /// Check if all dependencies of an extension are installed
    pub fn check_dependencies(
        &self,
        extension: &str,
        installed: &HashSet<String>,
    ) -> Result<Vec<String>, CoreError> {
        let deps = self.dependencies.get(extension).cloned().unwrap_or_default();

        let missing: Vec<_> = deps
            .into_iter()
            .filter(|d| !installed.contains(d))
            .collect();

        Ok(missing)
    }
}
