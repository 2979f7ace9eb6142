//! Protean serialization core
//!
//! The serializer-facing half of the engine: profiles describing a
//! serializer on the wire, runtime validation of object graphs against a
//! configuration's registered types, untagged polymorphic resolution for
//! legacy payloads, and the facade that ties a format backend to all of it.
//!
//! # Core Concepts
//!
//! - [`SerializerProfile`]: the (format, configuration, compression) triple
//!   stamped onto every payload
//! - [`UnregisteredTypePolicy`]: what to do when validation meets a type
//!   nobody registered
//! - [`GraphValidator`]: declared-type checks on deserialize, runtime-graph
//!   walks on serialize, just-in-time closed-generic registration
//! - [`UntaggedResolver`]: shape-based elimination down to exactly one
//!   concrete type
//! - [`FormatBackend`] / [`Serializer`]: the codec seam and the facade
//!
//! # Example
//!
//! ```rust,ignore
//! use protean_core::{Serializer, SerializerProfile, UnregisteredTypePolicy, WireFormat};
//!
//! let profile = SerializerProfile::new(WireFormat::Document, "geometry".into());
//! let serializer = Serializer::new(&registry, profile, UnregisteredTypePolicy::Default, backend)?;
//! let payload = serializer.serialize(&square)?;
//! ```

mod backend;
mod error;
mod policy;
mod profile;
mod resolver;
mod serializer;
mod validator;

pub use backend::{DecodedValue, FormatBackend};
pub use error::{BackendError, ResolveError, SerializerError, ValidationError};
pub use policy::UnregisteredTypePolicy;
pub use profile::{Compression, SerializerProfile, WireFormat};
pub use resolver::{PayloadShape, TrialFn, UntaggedResolver};
pub use serializer::{Payload, Serializer};
pub use validator::GraphValidator;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
