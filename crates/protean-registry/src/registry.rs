//! Configuration registry
//!
//! [`ConfigRegistry`] resolves a configuration identity into a fully merged,
//! initialize-once [`ConfigInstance`]. Dependencies initialize depth-first
//! and are memoized: an identity appearing twice in the transitive graph
//! initializes once. Each dependency's own (non-inherited) records merge
//! into the requesting configuration's index *before* the requesting
//! configuration's own requests expand, so a later configuration can never
//! silently re-register a type a dependency already owns.
//!
//! Initialization follows check-lock-check: already-initialized identities
//! are read without holding the init lock, and a given identity's
//! initialization runs exactly once even under concurrent first access.

use crate::closure::ClosureBuilder;
use crate::config::{ConfigId, ConfigInstance, SharedConfig};
use crate::error::RegistryError;
use crate::index::RegisteredTypes;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use protean_types::TypeUniverse;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Process-wide resolver of configuration identities
pub struct ConfigRegistry {
    universe: Arc<TypeUniverse>,
    catalog: RwLock<HashMap<ConfigId, SharedConfig>>,
    instances: RwLock<HashMap<ConfigId, Arc<ConfigInstance>>>,
    init_lock: Mutex<()>,
}

impl ConfigRegistry {
    /// Create a registry over `universe`
    #[must_use]
    pub fn new(universe: Arc<TypeUniverse>) -> Self {
        Self {
            universe,
            catalog: RwLock::new(HashMap::new()),
            instances: RwLock::new(HashMap::new()),
            init_lock: Mutex::new(()),
        }
    }

    /// The universe this registry discovers candidates in
    #[inline]
    #[must_use]
    pub fn universe(&self) -> &Arc<TypeUniverse> {
        &self.universe
    }

    /// Declare a configuration so it can be resolved by identity
    ///
    /// Declaring is separate from initializing: nothing is registered until
    /// the first [`ConfigRegistry::get_or_initialize`] for the identity.
    pub fn declare(&self, config: SharedConfig) {
        let identity = config.identity();
        debug!(%identity, "configuration declared");
        self.catalog.write().insert(identity, config);
    }

    /// Resolve an identity to its initialized instance
    ///
    /// # Errors
    /// Fails on an undeclared identity, a dependency cycle, a dependency
    /// violating the root's format family, or any registration error while
    /// building the closure.
    pub fn get_or_initialize(&self, identity: &ConfigId) -> Result<Arc<ConfigInstance>, RegistryError> {
        if let Some(instance) = self.instances.read().get(identity) {
            return Ok(instance.clone());
        }

        let _guard = self.init_lock.lock();
        if let Some(instance) = self.instances.read().get(identity) {
            return Ok(instance.clone());
        }

        let mut in_progress = Vec::new();
        self.initialize(identity, &mut in_progress)
    }

    fn initialize(
        &self,
        identity: &ConfigId,
        in_progress: &mut Vec<ConfigId>,
    ) -> Result<Arc<ConfigInstance>, RegistryError> {
        if let Some(instance) = self.instances.read().get(identity) {
            return Ok(instance.clone());
        }
        if in_progress.contains(identity) {
            let mut path = in_progress.clone();
            path.push(identity.clone());
            return Err(RegistryError::DependencyCycle { path });
        }

        let config = self
            .catalog
            .read()
            .get(identity)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownConfig(identity.clone()))?;

        in_progress.push(identity.clone());
        for dependency in config.dependencies() {
            self.initialize(&dependency, in_progress)?;
        }

        let index = RegisteredTypes::new();
        let mut merged = HashSet::new();
        self.merge_dependencies(&config, identity, &index, &mut merged)?;

        let hook = |record: &crate::index::RegistrationRecord| config.on_record(record);
        let own_records = ClosureBuilder::new(&self.universe, &index, identity.clone())
            .with_hook(&hook)
            .expand(config.requests())?;
        config.on_finalize(&index);

        let instance = Arc::new(ConfigInstance::new(
            identity.clone(),
            config.family(),
            config.permissive(),
            index,
            own_records,
        ));
        self.instances
            .write()
            .insert(identity.clone(), instance.clone());
        in_progress.pop();

        debug!(
            %identity,
            family = ?config.family(),
            own = instance.own_records().len(),
            total = instance.index().len(),
            "configuration initialized"
        );
        Ok(instance)
    }

    /// Merge every transitive dependency's own records into `index`
    ///
    /// Depth-first with a visited set, so a diamond-shaped graph merges each
    /// configuration's records exactly once. A genuine double claim (two
    /// distinct configurations owning the same type) still collides in
    /// [`RegisteredTypes::try_register`] and fails fast.
    fn merge_dependencies(
        &self,
        config: &SharedConfig,
        root: &ConfigId,
        index: &RegisteredTypes,
        merged: &mut HashSet<ConfigId>,
    ) -> Result<(), RegistryError> {
        for dependency in config.dependencies() {
            if !merged.insert(dependency.clone()) {
                continue;
            }
            let instance = self
                .instances
                .read()
                .get(&dependency)
                .cloned()
                .ok_or_else(|| RegistryError::UnknownConfig(dependency.clone()))?;

            if !instance.family().compatible_with(config.family()) {
                return Err(RegistryError::IncompatibleDependency {
                    root: root.clone(),
                    dependency: dependency.clone(),
                    required: config.family(),
                    found: instance.family(),
                });
            }

            let declared = self
                .catalog
                .read()
                .get(&dependency)
                .cloned()
                .ok_or_else(|| RegistryError::UnknownConfig(dependency.clone()))?;
            self.merge_dependencies(&declared, root, index, merged)?;

            for record in instance.own_records() {
                index.try_register(record.clone())?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ConfigRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigRegistry")
            .field("declared", &self.catalog.read().len())
            .field("initialized", &self.instances.read().len())
            .finish_non_exhaustive()
    }
}

static GLOBAL: Lazy<ConfigRegistry> =
    Lazy::new(|| ConfigRegistry::new(Arc::new(TypeUniverse::new())));

/// The process-wide default registry
#[must_use]
pub fn global() -> &'static ConfigRegistry {
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FormatFamily, RegistrationConfig};
    use crate::request::RegistrationRequest;
    use protean_types::{builtin, TypeDescriptor, TypeKey, TypeKind, TypeModule};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn universe() -> Arc<TypeUniverse> {
        let u = TypeUniverse::new();
        u.install(
            &TypeModule::new("geometry")
                .declare(TypeDescriptor::builder("geometry.Shape", TypeKind::Abstract))
                .declare(
                    TypeDescriptor::builder("geometry.Square", TypeKind::Struct)
                        .property("a", builtin::int32())
                        .property("b", builtin::int32())
                        .ancestor(TypeKey::new("geometry.Shape")),
                )
                .declare(
                    TypeDescriptor::builder("geometry.Triangle", TypeKind::Struct)
                        .property("a", builtin::int32())
                        .ancestor(TypeKey::new("geometry.Shape")),
                ),
        );
        u.install(
            &TypeModule::new("drawing").declare(
                TypeDescriptor::builder("drawing.Canvas", TypeKind::Struct)
                    .property("primary", TypeKey::new("geometry.Square")),
            ),
        );
        Arc::new(u)
    }

    struct Fixture {
        identity: &'static str,
        family: FormatFamily,
        dependencies: Vec<&'static str>,
        targets: Vec<TypeKey>,
        permissive: bool,
        initialized: AtomicUsize,
    }

    impl Fixture {
        fn new(identity: &'static str, targets: Vec<TypeKey>) -> Arc<Self> {
            Arc::new(Self {
                identity,
                family: FormatFamily::Neutral,
                dependencies: Vec::new(),
                targets,
                permissive: false,
                initialized: AtomicUsize::new(0),
            })
        }

        fn with_deps(
            identity: &'static str,
            dependencies: Vec<&'static str>,
            targets: Vec<TypeKey>,
        ) -> Arc<Self> {
            Arc::new(Self {
                identity,
                family: FormatFamily::Neutral,
                dependencies,
                targets,
                permissive: false,
                initialized: AtomicUsize::new(0),
            })
        }
    }

    impl RegistrationConfig for Fixture {
        fn identity(&self) -> ConfigId {
            ConfigId::new(self.identity)
        }

        fn family(&self) -> FormatFamily {
            self.family
        }

        fn dependencies(&self) -> Vec<ConfigId> {
            self.dependencies.iter().map(|d| ConfigId::new(*d)).collect()
        }

        fn requests(&self) -> Vec<RegistrationRequest> {
            self.initialized.fetch_add(1, Ordering::SeqCst);
            self.targets
                .iter()
                .cloned()
                .map(RegistrationRequest::origin)
                .collect()
        }

        fn permissive(&self) -> bool {
            self.permissive
        }
    }

    #[test]
    fn initialization_is_memoized() {
        let registry = ConfigRegistry::new(universe());
        let config = Fixture::new("geometry", vec![TypeKey::new("geometry.Square")]);
        registry.declare(config.clone());

        let first = registry.get_or_initialize(&ConfigId::new("geometry")).unwrap();
        let second = registry.get_or_initialize(&ConfigId::new("geometry")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(config.initialized.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_first_access_initializes_once() {
        let registry = ConfigRegistry::new(universe());
        let config = Fixture::new("geometry", vec![TypeKey::new("geometry.Square")]);
        registry.declare(config.clone());

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    registry
                        .get_or_initialize(&ConfigId::new("geometry"))
                        .unwrap();
                });
            }
        });
        assert_eq!(config.initialized.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unknown_identity_fails() {
        let registry = ConfigRegistry::new(universe());
        let err = registry.get_or_initialize(&ConfigId::new("nowhere")).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownConfig(_)));
    }

    #[test]
    fn dependency_records_visible_through_dependent() {
        let registry = ConfigRegistry::new(universe());
        registry.declare(Fixture::new(
            "geometry",
            vec![TypeKey::new("geometry.Square")],
        ));
        registry.declare(Fixture::with_deps(
            "drawing",
            vec!["geometry"],
            vec![TypeKey::new("drawing.Canvas")],
        ));

        let drawing = registry.get_or_initialize(&ConfigId::new("drawing")).unwrap();
        assert!(drawing.is_registered(&TypeKey::new("drawing.Canvas")));
        assert!(drawing.is_registered(&TypeKey::new("geometry.Square")));
        // Inherited types keep their original owner.
        assert_eq!(
            drawing.owner_of(&TypeKey::new("geometry.Square")),
            Some(ConfigId::new("geometry"))
        );
        // Canvas's member expansion found Square already owned: no duplicate.
        assert_eq!(
            drawing.own_records().iter().filter(|r| r.key == TypeKey::new("geometry.Square")).count(),
            0
        );
    }

    #[test]
    fn diamond_dependencies_initialize_and_merge_once() {
        let registry = ConfigRegistry::new(universe());
        let shared = Fixture::new("shared", vec![TypeKey::new("geometry.Square")]);
        registry.declare(shared.clone());
        registry.declare(Fixture::with_deps("left", vec!["shared"], vec![]));
        registry.declare(Fixture::with_deps("right", vec!["shared"], vec![]));
        registry.declare(Fixture::with_deps(
            "root",
            vec!["left", "right"],
            vec![TypeKey::new("drawing.Canvas")],
        ));

        let root = registry.get_or_initialize(&ConfigId::new("root")).unwrap();
        assert_eq!(shared.initialized.load(Ordering::SeqCst), 1);
        assert!(root.is_registered(&TypeKey::new("geometry.Square")));
    }

    #[test]
    fn cross_configuration_double_claim_fails_fast() {
        let registry = ConfigRegistry::new(universe());
        registry.declare(Fixture::new("first", vec![TypeKey::new("geometry.Square")]));
        registry.declare(Fixture::with_deps(
            "second",
            vec!["first"],
            vec![TypeKey::new("geometry.Square")],
        ));

        let err = registry.get_or_initialize(&ConfigId::new("second")).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Registration(crate::error::RegistrationError::Duplicate { .. })
        ));
    }

    #[test]
    fn dependency_cycle_is_reported_with_path() {
        let registry = ConfigRegistry::new(universe());
        registry.declare(Fixture::with_deps("a", vec!["b"], vec![]));
        registry.declare(Fixture::with_deps("b", vec!["a"], vec![]));

        let err = registry.get_or_initialize(&ConfigId::new("a")).unwrap_err();
        assert!(matches!(err, RegistryError::DependencyCycle { .. }));
    }

    #[test]
    fn incompatible_family_names_the_dependency() {
        let registry = ConfigRegistry::new(universe());
        registry.declare(Arc::new(FamilyFixture {
            identity: "binary-base",
            family: FormatFamily::Binary,
            dependencies: vec![],
        }));
        registry.declare(Arc::new(FamilyFixture {
            identity: "document-root",
            family: FormatFamily::Document,
            dependencies: vec!["binary-base"],
        }));

        let err = registry
            .get_or_initialize(&ConfigId::new("document-root"))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::IncompatibleDependency { dependency, .. }
                if dependency == ConfigId::new("binary-base")
        ));
    }

    struct FamilyFixture {
        identity: &'static str,
        family: FormatFamily,
        dependencies: Vec<&'static str>,
    }

    impl RegistrationConfig for FamilyFixture {
        fn identity(&self) -> ConfigId {
            ConfigId::new(self.identity)
        }

        fn family(&self) -> FormatFamily {
            self.family
        }

        fn dependencies(&self) -> Vec<ConfigId> {
            self.dependencies.iter().map(|d| ConfigId::new(*d)).collect()
        }

        fn requests(&self) -> Vec<RegistrationRequest> {
            Vec::new()
        }
    }

    #[test]
    fn finalize_hook_sees_full_index() {
        use parking_lot::Mutex as PMutex;

        struct Hooked {
            finalized_with: PMutex<Option<usize>>,
            records_seen: AtomicUsize,
        }

        impl RegistrationConfig for Hooked {
            fn identity(&self) -> ConfigId {
                ConfigId::new("hooked")
            }

            fn requests(&self) -> Vec<RegistrationRequest> {
                vec![RegistrationRequest::origin(TypeKey::new("geometry.Square"))]
            }

            fn on_record(&self, _record: &crate::index::RegistrationRecord) {
                self.records_seen.fetch_add(1, Ordering::SeqCst);
            }

            fn on_finalize(&self, index: &RegisteredTypes) {
                *self.finalized_with.lock() = Some(index.len());
            }
        }

        let registry = ConfigRegistry::new(universe());
        let hooked = Arc::new(Hooked {
            finalized_with: PMutex::new(None),
            records_seen: AtomicUsize::new(0),
        });
        registry.declare(hooked.clone());
        registry.get_or_initialize(&ConfigId::new("hooked")).unwrap();

        assert_eq!(hooked.records_seen.load(Ordering::SeqCst), 1);
        assert_eq!(*hooked.finalized_with.lock(), Some(1));
    }
}
