//! Type manifests
//!
//! A [`TypeModule`] is the unit of installation into the universe: a named
//! batch of declared types, standing in for a loaded code module. Modules
//! are monotonic: once installed they are never removed, and re-installing
//! a module by the same name yields the memoized first result.
//!
//! Declarations are validated at install time. A declaration that fails
//! validation is recorded and skipped; the rest of the module installs.

use crate::descriptor::{DescriptorError, TypeDescriptorBuilder};

/// A named batch of type declarations
#[derive(Debug, Clone)]
pub struct TypeModule {
    name: String,
    declarations: Vec<TypeDescriptorBuilder>,
}

impl TypeModule {
    /// Create an empty module
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declarations: Vec::new(),
        }
    }

    /// Module name (installation key)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared types, not yet validated
    #[inline]
    #[must_use]
    pub fn declarations(&self) -> &[TypeDescriptorBuilder] {
        &self.declarations
    }

    /// Add a declaration
    #[must_use]
    pub fn declare(mut self, declaration: TypeDescriptorBuilder) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Add every declaration in `declarations`
    #[must_use]
    pub fn declare_all(
        mut self,
        declarations: impl IntoIterator<Item = TypeDescriptorBuilder>,
    ) -> Self {
        self.declarations.extend(declarations);
        self
    }
}

/// One declaration that could not be installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFailure {
    /// Name of the offending type
    pub type_name: String,

    /// Why installation was skipped
    pub reason: ManifestFailureReason,
}

/// Reason a declaration was skipped during installation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestFailureReason {
    /// The declaration itself is malformed
    #[error(transparent)]
    Malformed(#[from] DescriptorError),

    /// Another module already installed this name
    #[error("name already installed by module {module}")]
    NameTaken {
        /// Module that installed the name first
        module: String,
    },
}

/// Outcome of installing one module
///
/// Installation is never fatal: declarations that fail are recorded here and
/// the rest of the module is kept. The universe is only used for candidate
/// discovery, so partial results are acceptable.
#[derive(Debug, Clone, Default)]
pub struct ModuleReport {
    /// Module name
    pub module: String,

    /// Number of descriptors installed
    pub installed: usize,

    /// Declarations skipped, with reasons
    pub failures: Vec<ManifestFailure>,
}

impl ModuleReport {
    /// Whether every declaration installed cleanly
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
