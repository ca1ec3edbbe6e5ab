//! Type definitions for Sindri configuration and extensions

mod extension_types;
mod registry_types;
mod retry_policy;

pub use extension_types::*;
pub use registry_types::*;
pub use retry_policy::*;
