//! # sindri-core
//!
//! Core library underpinning the extension capability engine:
//! - Environment-driven engine configuration
//! - JSON Schema validation for extension manifests
//! - Type definitions for extensions, registries, and profiles
//! - A reusable, policy-based retry execution engine

pub mod config;
pub mod error;
pub mod retry;
pub mod schema;
pub mod types;
pub mod utils;

pub use config::SindriConfig;
pub use error::{Error, Result};
pub use schema::SchemaValidator;
