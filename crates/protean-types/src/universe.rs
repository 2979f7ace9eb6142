//! The type universe
//!
//! [`TypeUniverse`] is the process-wide index of every declared type: a
//! module-keyed, append-only store used for candidate discovery (relation
//! expansion, untagged resolution) and for the registrable predicate.
//!
//! The universe is safe for concurrent population. Module installation is
//! memoized per name; installing the same module twice yields the first
//! report. The name index serializes installs behind a write lock, so a
//! redundant concurrent install observes the memoized result, never a
//! half-installed module.

use crate::builtin;
use crate::descriptor::TypeDescriptor;
use crate::key::TypeKey;
use crate::manifest::{ManifestFailure, ManifestFailureReason, ModuleReport, TypeModule};
use dashmap::DashMap;
use parking_lot::RwLock;
use radix_trie::{Trie, TrieCommon};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Whether a key may be registered, and if not, why
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registrability {
    /// The key may be registered
    Registrable,

    /// Builtin or otherwise excluded root
    Blacklisted {
        /// Which exclusion applied
        reason: String,
    },

    /// The key leaves generic parameters unbound
    OpenGeneric,

    /// The type is compiler-synthesized
    Synthesized,

    /// No descriptor is installed for this name
    Unknown,
}

impl Registrability {
    /// Whether the verdict permits registration
    #[inline]
    #[must_use]
    pub fn is_registrable(&self) -> bool {
        matches!(self, Registrability::Registrable)
    }
}

#[derive(Debug, Clone)]
struct Installed {
    descriptor: Arc<TypeDescriptor>,
    module: String,
}

/// Process-wide index of declared types
#[derive(Debug)]
pub struct TypeUniverse {
    reports: DashMap<String, Arc<ModuleReport>>,
    by_name: RwLock<Trie<String, Installed>>,
}

impl Default for TypeUniverse {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeUniverse {
    /// Create an empty universe
    #[must_use]
    pub fn new() -> Self {
        Self {
            reports: DashMap::new(),
            by_name: RwLock::new(Trie::new()),
        }
    }

    /// Install a module, validating each declaration
    ///
    /// Memoized by module name. Declarations that fail validation or collide
    /// with an already-installed name are recorded in the report and
    /// skipped; the rest of the module installs.
    pub fn install(&self, module: &TypeModule) -> Arc<ModuleReport> {
        if let Some(report) = self.reports.get(module.name()) {
            return report.clone();
        }

        let mut index = self.by_name.write();
        // Re-check under the install lock: a racing install of the same
        // module may have completed while we waited.
        if let Some(report) = self.reports.get(module.name()) {
            return report.clone();
        }

        let mut report = ModuleReport {
            module: module.name().to_string(),
            installed: 0,
            failures: Vec::new(),
        };
        for declaration in module.declarations() {
            let type_name = declaration.name().to_string();
            match declaration.clone().build() {
                Ok(descriptor) => {
                    if let Some(existing) = index.get(&type_name) {
                        warn!(
                            module = module.name(),
                            ty = %type_name,
                            taken_by = %existing.module,
                            "skipping declaration: name already installed"
                        );
                        report.failures.push(ManifestFailure {
                            type_name,
                            reason: ManifestFailureReason::NameTaken {
                                module: existing.module.clone(),
                            },
                        });
                    } else {
                        index.insert(
                            type_name,
                            Installed {
                                descriptor: Arc::new(descriptor),
                                module: module.name().to_string(),
                            },
                        );
                        report.installed += 1;
                    }
                }
                Err(error) => {
                    warn!(
                        module = module.name(),
                        ty = %type_name,
                        %error,
                        "skipping malformed declaration"
                    );
                    report.failures.push(ManifestFailure {
                        type_name,
                        reason: ManifestFailureReason::Malformed(error),
                    });
                }
            }
        }
        debug!(
            module = module.name(),
            installed = report.installed,
            skipped = report.failures.len(),
            "module installed"
        );

        let report = Arc::new(report);
        self.reports.insert(module.name().to_string(), report.clone());
        report
    }

    /// Descriptor for a key's base name, if installed
    ///
    /// A closed generic key resolves to its template's descriptor.
    #[must_use]
    pub fn descriptor(&self, key: &TypeKey) -> Option<Arc<TypeDescriptor>> {
        self.by_name
            .read()
            .get(&key.name().to_string())
            .map(|installed| installed.descriptor.clone())
    }

    /// Whether a key may be registered
    ///
    /// Builtin roots (object, string, scalars, containers) are blacklisted;
    /// synthesized types, partially-bound generics, and names with no
    /// installed descriptor each get their own verdict so callers can report
    /// precisely. A bare template key (no bound arguments) is registrable:
    /// registering it is how a configuration claims the open definition.
    #[must_use]
    pub fn registrability(&self, key: &TypeKey) -> Registrability {
        if builtin::is_object(key) {
            return Registrability::Blacklisted {
                reason: "untyped object root".to_string(),
            };
        }
        if builtin::is_container(key) {
            return Registrability::Blacklisted {
                reason: format!("builtin container {}", key.name()),
            };
        }
        if builtin::is_builtin(key) {
            return Registrability::Blacklisted {
                reason: format!("builtin scalar {}", key.name()),
            };
        }
        let Some(descriptor) = self.descriptor(key) else {
            return Registrability::Unknown;
        };
        if descriptor.is_synthesized() {
            return Registrability::Synthesized;
        }
        if key.has_args() {
            if key.args().len() < descriptor.arity() {
                return Registrability::OpenGeneric;
            }
            if key.args().len() > descriptor.arity() {
                return Registrability::Blacklisted {
                    reason: format!(
                        "binds {} arguments, template declares {}",
                        key.args().len(),
                        descriptor.arity()
                    ),
                };
            }
        }
        Registrability::Registrable
    }

    /// Every installed, non-generic, non-synthesized descriptor
    ///
    /// Templates are excluded: only closed keys name something an object
    /// graph can actually contain, and closed instantiations enter the
    /// system through registration, not discovery.
    #[must_use]
    pub fn registrable_types(&self) -> Vec<Arc<TypeDescriptor>> {
        self.by_name
            .read()
            .values()
            .filter(|installed| {
                !installed.descriptor.is_synthesized() && installed.descriptor.arity() == 0
            })
            .map(|installed| installed.descriptor.clone())
            .collect()
    }

    /// Installed descriptors whose name starts with `module` prefix
    #[must_use]
    pub fn types_in_module(&self, module: &str) -> Vec<Arc<TypeDescriptor>> {
        let index = self.by_name.read();
        index
            .get_raw_descendant(&module.to_string())
            .map(|subtrie| {
                subtrie
                    .values()
                    .map(|installed| installed.descriptor.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Transitive ancestors of a key, nearest first
    #[must_use]
    pub fn ancestors_of(&self, key: &TypeKey) -> Vec<TypeKey> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut frontier = vec![key.template()];
        while let Some(current) = frontier.pop() {
            let Some(descriptor) = self.descriptor(&current) else {
                continue;
            };
            for ancestor in descriptor.ancestors() {
                if seen.insert(ancestor.clone()) {
                    out.push(ancestor.clone());
                    frontier.push(ancestor.clone());
                }
            }
        }
        out
    }

    /// Every registrable type whose transitive ancestors include `key`
    #[must_use]
    pub fn descendants_of(&self, key: &TypeKey) -> Vec<TypeKey> {
        self.registrable_types()
            .iter()
            .filter(|descriptor| descriptor.key() != key)
            .filter(|descriptor| self.ancestors_of(descriptor.key()).contains(key))
            .map(|descriptor| descriptor.key().clone())
            .collect()
    }

    /// Concrete, instantiable candidates assignable to `declared`
    ///
    /// Includes `declared` itself when it is concrete. Assignability is
    /// nominal: a candidate's declared ancestor chain must reach the
    /// declared key; there is no structural inference.
    #[must_use]
    pub fn assignable_concrete(&self, declared: &TypeKey) -> Vec<Arc<TypeDescriptor>> {
        self.registrable_types()
            .into_iter()
            .filter(|descriptor| descriptor.is_instantiable())
            .filter(|descriptor| {
                descriptor.key() == declared || self.ancestors_of(descriptor.key()).contains(declared)
            })
            .collect()
    }
}
