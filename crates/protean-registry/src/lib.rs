//! Protean registration engine
//!
//! Turns composable configuration declarations into initialized, immutable
//! registration state: which concrete types a serializer may touch, and who
//! owns each one.
//!
//! # Core Concepts
//!
//! - [`RegistrationRequest`]: one type plus its member/relation expansion
//!   policies; *origin* requests error on collision, *spawned* requests
//!   skip silently
//! - [`ClosureBuilder`]: breadth-first expansion of requests into the full
//!   closure a configuration owns
//! - [`RegisteredTypes`]: type → owning configuration, with strict duplicate
//!   detection and the idempotent closed-generic append path
//! - [`RegistrationConfig`]: the author-facing configuration trait
//! - [`ConfigRegistry`]: identity → initialize-once instance resolution with
//!   depth-first dependency merging
//!
//! # Example
//!
//! ```rust,ignore
//! use protean_registry::{ConfigId, ConfigRegistry, RegistrationRequest};
//!
//! let registry = ConfigRegistry::new(universe);
//! registry.declare(std::sync::Arc::new(GeometryConfig));
//! let instance = registry.get_or_initialize(&ConfigId::new("geometry"))?;
//! assert!(instance.is_registered(&"geometry.Square".into()));
//! ```

mod closure;
mod config;
mod error;
mod index;
mod registry;
mod request;

pub use closure::{ClosureBuilder, RecordHook};
pub use config::{ConfigId, ConfigInstance, FormatFamily, RegistrationConfig, SharedConfig};
pub use error::{RegistrationError, RegistryError};
pub use index::{RegisteredTypes, RegistrationRecord};
pub use registry::{global, ConfigRegistry};
pub use request::{MemberExpansion, RegistrationRequest, RelationExpansion, RequestKey};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
