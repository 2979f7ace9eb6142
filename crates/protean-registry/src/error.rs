//! Error types for registration and configuration resolution
//!
//! Everything here is a configuration-authoring error: construction-time,
//! fatal, and deterministic: retrying without changing the declarations
//! produces the same failure.

use crate::config::{ConfigId, FormatFamily};
use protean_types::TypeKey;

/// Failures while registering types into a configuration's closure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// Origin request for a key with unbound generic parameters
    #[error("cannot register open type {key}: generic parameters are unbound")]
    OpenType {
        /// Offending key
        key: TypeKey,
    },

    /// Origin request for a blacklisted or otherwise non-registrable type
    #[error("cannot register {key}: {reason}")]
    NotRegistrable {
        /// Offending key
        key: TypeKey,
        /// Which exclusion applied
        reason: String,
    },

    /// A type claimed by two registrations within one dependency closure
    ///
    /// Raised both for a duplicate within a single configuration and for a
    /// collision between two configurations in the same closure.
    #[error("type {key} is already registered by {existing}, also claimed by {claimant}")]
    Duplicate {
        /// Contested type
        key: TypeKey,
        /// Configuration that registered it first
        existing: ConfigId,
        /// Configuration attempting the second registration
        claimant: ConfigId,
    },
}

/// Failures while resolving and initializing configurations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No configuration declared under this identity
    #[error("unknown configuration {0}")]
    UnknownConfig(ConfigId),

    /// The dependency graph loops back on itself
    #[error("configuration dependency cycle: {}", format_path(path))]
    DependencyCycle {
        /// Identities along the cycle, in resolution order
        path: Vec<ConfigId>,
    },

    /// A dependency does not follow the root's format convention
    #[error(
        "configuration {dependency} (family {found:?}) does not share the \
         structural family {required:?} required by {root}"
    )]
    IncompatibleDependency {
        /// Root configuration being initialized
        root: ConfigId,
        /// Offending dependency
        dependency: ConfigId,
        /// Family the root requires
        required: FormatFamily,
        /// Family the dependency declares
        found: FormatFamily,
    },

    /// Registration failed while building the closure
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

fn format_path(path: &[ConfigId]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_both_owners() {
        let err = RegistrationError::Duplicate {
            key: TypeKey::new("geometry.Square"),
            existing: ConfigId::new("geometry"),
            claimant: ConfigId::new("drawing"),
        };
        let text = err.to_string();
        assert!(text.contains("geometry.Square"));
        assert!(text.contains("geometry"));
        assert!(text.contains("drawing"));
    }

    #[test]
    fn cycle_renders_path() {
        let err = RegistryError::DependencyCycle {
            path: vec![ConfigId::new("a"), ConfigId::new("b"), ConfigId::new("a")],
        };
        assert_eq!(
            err.to_string(),
            "configuration dependency cycle: a -> b -> a"
        );
    }
}
