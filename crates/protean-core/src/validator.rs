//! Runtime type validation
//!
//! [`GraphValidator`] is consulted on every serialize and deserialize call.
//! Deserializing validates the *declared* target type; serializing walks the
//! actual object graph and validates every *runtime* type it finds, since
//! the declared type of a member proves nothing about what the member holds.
//!
//! Builtin types are exempt. Builtin containers are transparent: their
//! arguments are validated instead. A closed generic instantiation of a
//! registered open definition is registered just-in-time and remembered.

use crate::error::ValidationError;
use crate::policy::UnregisteredTypePolicy;
use dashmap::DashMap;
use protean_registry::ConfigInstance;
use protean_types::{builtin, GraphValue, TypeKey, TypeUniverse, ValueView};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;

/// Validates declared types and runtime object graphs against a
/// configuration's registered-type index
pub struct GraphValidator {
    instance: Arc<ConfigInstance>,
    universe: Arc<TypeUniverse>,
    member_plans: DashMap<TypeKey, Arc<Vec<String>>>,
}

impl GraphValidator {
    /// Create a validator for one initialized configuration
    #[must_use]
    pub fn new(instance: Arc<ConfigInstance>, universe: Arc<TypeUniverse>) -> Self {
        Self {
            instance,
            universe,
            member_plans: DashMap::new(),
        }
    }

    /// The configuration this validator checks against
    #[inline]
    #[must_use]
    pub fn instance(&self) -> &Arc<ConfigInstance> {
        &self.instance
    }

    /// Validate the declared target type of a deserialize call
    ///
    /// # Errors
    /// Under an enforcing policy, fails when the declared type (or a
    /// contained element/argument type) is unregistered, or when a closed
    /// generic's open definition has no owner.
    pub fn check_deserialize(
        &self,
        declared: &TypeKey,
        policy: UnregisteredTypePolicy,
    ) -> Result<(), ValidationError> {
        if !policy.enforces(self.instance.is_permissive()) {
            return Ok(());
        }
        self.check_type(declared, declared)
    }

    /// Validate the runtime type of every value in an object graph
    ///
    /// # Errors
    /// Under an enforcing policy, fails on the first unregistered runtime
    /// type, naming the outer type and the specific nested type that
    /// triggered the failure.
    pub fn check_serialize(
        &self,
        value: &dyn GraphValue,
        policy: UnregisteredTypePolicy,
    ) -> Result<(), ValidationError> {
        if !policy.enforces(self.instance.is_permissive()) {
            return Ok(());
        }
        let outer = value.runtime_type();
        let mut visited = HashSet::new();
        self.walk_node(value, &outer, &mut visited)
    }

    /// Validate one type key: registration, container transparency, JIT
    fn check_type(&self, key: &TypeKey, outer: &TypeKey) -> Result<(), ValidationError> {
        if builtin::is_container(key) {
            for arg in key.args() {
                self.check_type(arg, outer)?;
            }
            return Ok(());
        }
        if builtin::is_builtin(key) {
            return Ok(());
        }
        if self.instance.is_registered(key) {
            return Ok(());
        }
        if key.has_args() {
            let template = key.template();
            return match self.instance.owner_of(&template) {
                Some(owner) => {
                    trace!(closed = %key, %owner, "registering closed generic just-in-time");
                    self.instance.register_closed_generic(key.clone(), owner);
                    Ok(())
                }
                None => Err(ValidationError::OpenDefinitionUnregistered {
                    closed: key.clone(),
                    template,
                    config: self.instance.identity().clone(),
                }),
            };
        }
        Err(self.unregistered(key, outer))
    }

    fn walk_node(
        &self,
        value: &dyn GraphValue,
        outer: &TypeKey,
        visited: &mut HashSet<TypeKey>,
    ) -> Result<(), ValidationError> {
        let key = value.runtime_type();
        if builtin::is_builtin(&key) {
            return Ok(());
        }
        // A type already proven registered in this call is not re-walked;
        // this also bounds recursion on cyclic object graphs.
        if !visited.insert(key.clone()) {
            return Ok(());
        }
        self.check_type(&key, outer)?;

        let plan = self.member_plan(&key);
        for name in plan.iter() {
            if let Some(view) = value.member(name) {
                self.walk_view(&view, outer, visited)?;
            }
        }
        Ok(())
    }

    fn walk_view(
        &self,
        view: &ValueView<'_>,
        outer: &TypeKey,
        visited: &mut HashSet<TypeKey>,
    ) -> Result<(), ValidationError> {
        match view {
            ValueView::Missing => Ok(()),
            ValueView::Leaf(key) => {
                if builtin::is_builtin(key) {
                    Ok(())
                } else {
                    self.check_type(key, outer)
                }
            }
            ValueView::Node(value) => self.walk_node(*value, outer, visited),
            ValueView::Items(items) => {
                for item in items {
                    self.walk_view(item, outer, visited)?;
                }
                Ok(())
            }
            ValueView::Entries(entries) => {
                for (entry_key, entry_value) in entries {
                    self.walk_view(entry_key, outer, visited)?;
                    self.walk_view(entry_value, outer, visited)?;
                }
                Ok(())
            }
        }
    }

    /// Cached member-name plan for a runtime type
    ///
    /// Races populate the same value redundantly but safely.
    fn member_plan(&self, key: &TypeKey) -> Arc<Vec<String>> {
        if let Some(plan) = self.member_plans.get(key) {
            return plan.clone();
        }
        let plan = Arc::new(
            self.universe
                .descriptor(key)
                .map(|descriptor| {
                    descriptor
                        .member_names()
                        .into_iter()
                        .map(ToString::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        );
        self.member_plans
            .entry(key.clone())
            .or_insert(plan)
            .clone()
    }

    fn unregistered(&self, key: &TypeKey, outer: &TypeKey) -> ValidationError {
        let config = self.instance.identity().clone();
        if key == outer {
            ValidationError::Unregistered {
                outer: outer.clone(),
                config,
            }
        } else {
            ValidationError::UnregisteredNested {
                outer: outer.clone(),
                nested: key.clone(),
                config,
            }
        }
    }
}
