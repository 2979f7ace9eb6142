//! Untagged polymorphic resolution
//!
//! When a legacy payload carries no concrete-type tag and the declared type
//! is abstract, [`UntaggedResolver`] narrows the registered universe down to
//! exactly one candidate by shape: a disciplined elimination over the
//! payload's top-level keys, trial deserialization, and strict member
//! coverage. Anything short of exactly one survivor is a hard error;
//! resolution never guesses.
//!
//! Matching is first-level only: nested object shapes and array elements
//! are not inspected, and non-public members are never considered. A
//! candidate that lost a member since the payload was written becomes
//! ineligible; strict filtering can also reject the only semantically
//! correct candidate when a writer omitted default-valued members.

use crate::error::{BackendError, ResolveError};
use crate::validator::GraphValidator;
use protean_registry::ConfigInstance;
use protean_types::{builtin, TypeDescriptor, TypeKey, TypeUniverse};
use std::sync::Arc;
use tracing::{debug, warn};

/// Top-level shape of a payload: its keys, and an explicit tag if present
#[derive(Debug, Clone, Default)]
pub struct PayloadShape {
    keys: Vec<String>,
    tag: Option<TypeKey>,
}

impl PayloadShape {
    /// Shape from the payload's top-level property names
    ///
    /// Keys are matched case-insensitively; duplicates collapse.
    #[must_use]
    pub fn new(keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut keys: Vec<String> = keys
            .into_iter()
            .map(|k| k.into().to_ascii_lowercase())
            .collect();
        keys.sort();
        keys.dedup();
        Self { keys, tag: None }
    }

    /// Attach the payload's explicit concrete-type tag
    #[must_use]
    pub fn with_tag(mut self, tag: TypeKey) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Normalized (lowercase, sorted) top-level keys
    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Explicit tag, if the payload carried one
    #[inline]
    #[must_use]
    pub fn tag(&self) -> Option<&TypeKey> {
        self.tag.as_ref()
    }
}

/// Trial-deserialize callback supplied by the codec
///
/// The resolver never decodes format-specific bytes itself; it asks the
/// codec to try a candidate and reports only success or failure.
pub type TrialFn<'a> = dyn FnMut(&TypeKey) -> Result<(), BackendError> + 'a;

/// Resolves an untagged payload to exactly one concrete type
pub struct UntaggedResolver {
    validator: GraphValidator,
    universe: Arc<TypeUniverse>,
}

impl UntaggedResolver {
    /// Create a resolver over one initialized configuration
    #[must_use]
    pub fn new(instance: Arc<ConfigInstance>, universe: Arc<TypeUniverse>) -> Self {
        Self {
            validator: GraphValidator::new(instance, universe.clone()),
            universe,
        }
    }

    /// Resolve the concrete type to deserialize `shape` into
    ///
    /// An explicit tag short-circuits everything except registration
    /// validation. Otherwise candidates assignable to `declared` are
    /// filtered loosely (every payload key exists on the candidate), tried
    /// through `trial` (failures are swallowed: the one place this engine
    /// deliberately discards an error, since failing a trial is the
    /// expected fate of a wrong shape), and finally filtered strictly
    /// (every candidate member present in the payload).
    ///
    /// # Errors
    /// Fails when the declared type is the untyped root, when no candidate
    /// matches, when every trial fails, and when strict filtering ends with
    /// zero or more than one survivor.
    pub fn resolve(
        &self,
        declared: &TypeKey,
        shape: &PayloadShape,
        trial: &mut TrialFn<'_>,
    ) -> Result<TypeKey, ResolveError> {
        if let Some(tag) = shape.tag() {
            self.validator
                .check_deserialize(tag, crate::policy::UnregisteredTypePolicy::Throw)?;
            debug!(%tag, "resolved by explicit tag");
            return Ok(tag.clone());
        }

        if builtin::is_object(declared) {
            return Err(ResolveError::UntypedTarget);
        }

        let candidates = self.universe.assignable_concrete(declared);
        let loose: Vec<Arc<TypeDescriptor>> = candidates
            .iter()
            .filter(|candidate| candidate.covers_names(shape.keys().iter().map(String::as_str)))
            .cloned()
            .collect();

        if loose.is_empty() {
            if let Some(descriptor) = self.universe.descriptor(declared) {
                if descriptor.is_instantiable() {
                    debug!(%declared, "no shape match; falling back to concrete declared type");
                    return Ok(declared.clone());
                }
            }
            return Err(ResolveError::NoCandidates {
                declared: declared.clone(),
                keys: shape.keys().to_vec(),
                candidates: names(&candidates),
            });
        }

        let mut survivors: Vec<Arc<TypeDescriptor>> = Vec::new();
        for candidate in &loose {
            match trial(candidate.key()) {
                Ok(()) => survivors.push(candidate.clone()),
                Err(error) => {
                    // Expected outcome of trying the wrong shape, not a
                    // defect; the candidate is simply eliminated.
                    warn!(candidate = %candidate.key(), %error, "trial deserialization failed");
                }
            }
        }

        if survivors.is_empty() {
            return Err(ResolveError::AllTrialsFailed {
                declared: declared.clone(),
                keys: shape.keys().to_vec(),
                candidates: loose.iter().map(|c| c.key().to_string()).collect(),
            });
        }
        if let [only] = survivors.as_slice() {
            debug!(resolved = %only.key(), "single trial survivor");
            return Ok(only.key().clone());
        }

        let strict: Vec<&Arc<TypeDescriptor>> = survivors
            .iter()
            .filter(|candidate| {
                candidate
                    .member_names()
                    .iter()
                    .all(|member| shape.keys().iter().any(|key| member.eq_ignore_ascii_case(key)))
            })
            .collect();

        match strict.as_slice() {
            [] => Err(ResolveError::NoStrictMatch {
                declared: declared.clone(),
                keys: shape.keys().to_vec(),
                candidates: survivors.iter().map(|c| c.key().to_string()).collect(),
            }),
            [only] => {
                debug!(resolved = %only.key(), "single strict survivor");
                Ok(only.key().clone())
            }
            many => Err(ResolveError::Ambiguous {
                declared: declared.clone(),
                keys: shape.keys().to_vec(),
                candidates: many.iter().map(|c| c.key().to_string()).collect(),
            }),
        }
    }
}

fn names(candidates: &[Arc<TypeDescriptor>]) -> Vec<String> {
    candidates.iter().map(|c| c.key().to_string()).collect()
}
