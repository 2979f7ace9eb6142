//! Protean type model
//!
//! Type identity, declared type descriptors, and the process-wide universe
//! of registrable types. This crate is the foundation the registration and
//! validation layers build on.
//!
//! # Core Concepts
//!
//! - [`TypeKey`]: stable, structural identity of a possibly-generic type
//! - [`builtin`]: the `std.*` namespace the engine never registers
//! - [`TypeDescriptor`]: declared shape of a type (members, ancestors, arity)
//! - [`TypeModule`]: the unit of manifest installation
//! - [`TypeUniverse`]: module-keyed, append-only index for candidate discovery
//! - [`GraphValue`]: runtime object-graph facade for serialize-time walks
//!
//! # Example
//!
//! ```rust,ignore
//! use protean_types::{builtin, TypeDescriptor, TypeKind, TypeModule, TypeUniverse};
//!
//! let universe = TypeUniverse::new();
//! universe.install(
//!     &TypeModule::new("geometry")
//!         .declare(TypeDescriptor::builder("geometry.Shape", TypeKind::Abstract))
//!         .declare(
//!             TypeDescriptor::builder("geometry.Square", TypeKind::Struct)
//!                 .property("a", builtin::int32())
//!                 .ancestor("geometry.Shape".into()),
//!         ),
//! );
//! ```

pub mod builtin;
mod descriptor;
mod key;
mod manifest;
mod universe;
mod value;

pub use descriptor::{
    DescriptorError, MemberDescriptor, MemberKind, MemberType, TypeDescriptor,
    TypeDescriptorBuilder, TypeKind,
};
pub use key::TypeKey;
pub use manifest::{ManifestFailure, ManifestFailureReason, ModuleReport, TypeModule};
pub use universe::{Registrability, TypeUniverse};
pub use value::{GraphValue, ValueView};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
