//! Testing utilities for the protean workspace
//!
//! Shared fixture manifest, fixture configurations, and `GraphValue`
//! implementations used across crate tests.

#![allow(missing_docs)]

use protean_registry::{
    ConfigId, ConfigRegistry, FormatFamily, RegistrationConfig, RegistrationRequest,
    RelationExpansion,
};
use protean_types::{
    builtin, GraphValue, TypeDescriptor, TypeKey, TypeKind, TypeModule, TypeUniverse, ValueView,
};
use std::sync::Arc;

/// Well-known fixture type keys
pub mod geometry {
    use protean_types::TypeKey;

    #[must_use]
    pub fn shape() -> TypeKey {
        TypeKey::new("geometry.Shape")
    }

    #[must_use]
    pub fn square() -> TypeKey {
        TypeKey::new("geometry.Square")
    }

    #[must_use]
    pub fn triangle() -> TypeKey {
        TypeKey::new("geometry.Triangle")
    }

    #[must_use]
    pub fn circle() -> TypeKey {
        TypeKey::new("geometry.Circle")
    }

    #[must_use]
    pub fn tile() -> TypeKey {
        TypeKey::new("geometry.Tile")
    }

    #[must_use]
    pub fn canvas() -> TypeKey {
        TypeKey::new("geometry.Canvas")
    }
}

/// The fixture manifest: shapes, a cyclic node type, a generic wrapper
#[must_use]
pub fn fixture_universe() -> Arc<TypeUniverse> {
    let universe = TypeUniverse::new();
    universe.install(
        &TypeModule::new("geometry")
            .declare(TypeDescriptor::builder("geometry.Shape", TypeKind::Abstract))
            .declare(
                TypeDescriptor::builder("geometry.Square", TypeKind::Struct)
                    .property("a", builtin::int32())
                    .property("b", builtin::int32())
                    .ancestor(geometry::shape()),
            )
            .declare(
                TypeDescriptor::builder("geometry.Triangle", TypeKind::Struct)
                    .property("a", builtin::int32())
                    .ancestor(geometry::shape()),
            )
            .declare(
                TypeDescriptor::builder("geometry.Circle", TypeKind::Struct)
                    .property("radius", builtin::float64()),
            )
            .declare(TypeDescriptor::builder("geometry.Tile", TypeKind::Abstract))
            .declare(
                TypeDescriptor::builder("geometry.TileA", TypeKind::Struct)
                    .property("a", builtin::int32())
                    .property("b", builtin::int32())
                    .ancestor(geometry::tile()),
            )
            .declare(
                TypeDescriptor::builder("geometry.TileB", TypeKind::Struct)
                    .property("a", builtin::int32())
                    .property("b", builtin::int32())
                    .ancestor(geometry::tile()),
            )
            .declare(
                TypeDescriptor::builder("geometry.Canvas", TypeKind::Struct)
                    .property("title", builtin::string())
                    .property("primary", geometry::shape()),
            ),
    );
    universe.install(
        &TypeModule::new("graph").declare(
            TypeDescriptor::builder("graph.Node", TypeKind::Struct)
                .property("label", builtin::string())
                .property("children", builtin::list(TypeKey::new("graph.Node"))),
        ),
    );
    universe.install(
        &TypeModule::new("containers").declare(
            TypeDescriptor::builder("containers.Wrapper", TypeKind::Struct)
                .arity(1)
                .param_property("inner", 0),
        ),
    );
    Arc::new(universe)
}

/// Registers the whole geometry module: both hierarchies by descendant
/// expansion, plus the standalone circle and the canvas aggregate
pub struct GeometryConfig;

impl RegistrationConfig for GeometryConfig {
    fn identity(&self) -> ConfigId {
        ConfigId::new("geometry")
    }

    fn requests(&self) -> Vec<RegistrationRequest> {
        vec![
            RegistrationRequest::origin(geometry::shape())
                .with_relations(RelationExpansion::Descendants),
            RegistrationRequest::origin(geometry::tile())
                .with_relations(RelationExpansion::Descendants),
            RegistrationRequest::origin(geometry::circle()),
            RegistrationRequest::origin(geometry::canvas()),
        ]
    }
}

/// Registers the self-referential node type
pub struct GraphConfig;

impl RegistrationConfig for GraphConfig {
    fn identity(&self) -> ConfigId {
        ConfigId::new("graph")
    }

    fn requests(&self) -> Vec<RegistrationRequest> {
        vec![RegistrationRequest::origin(TypeKey::new("graph.Node"))]
    }
}

/// Registers the open wrapper definition (closed instantiations arrive
/// just-in-time)
pub struct ContainersConfig;

impl RegistrationConfig for ContainersConfig {
    fn identity(&self) -> ConfigId {
        ConfigId::new("containers")
    }

    fn requests(&self) -> Vec<RegistrationRequest> {
        vec![RegistrationRequest::origin(TypeKey::new("containers.Wrapper"))]
    }
}

/// Permissive null configuration: registers nothing, enforces nothing
pub struct NullConfig;

impl RegistrationConfig for NullConfig {
    fn identity(&self) -> ConfigId {
        ConfigId::new("null")
    }

    fn requests(&self) -> Vec<RegistrationRequest> {
        Vec::new()
    }

    fn permissive(&self) -> bool {
        true
    }
}

/// A document-family configuration over the geometry types
pub struct DocumentGeometryConfig;

impl RegistrationConfig for DocumentGeometryConfig {
    fn identity(&self) -> ConfigId {
        ConfigId::new("document-geometry")
    }

    fn family(&self) -> FormatFamily {
        FormatFamily::Document
    }

    fn dependencies(&self) -> Vec<ConfigId> {
        vec![ConfigId::new("geometry")]
    }

    fn requests(&self) -> Vec<RegistrationRequest> {
        Vec::new()
    }
}

/// A fresh registry over the fixture universe with every fixture
/// configuration declared
#[must_use]
pub fn fixture_registry() -> ConfigRegistry {
    let registry = ConfigRegistry::new(fixture_universe());
    registry.declare(Arc::new(GeometryConfig));
    registry.declare(Arc::new(GraphConfig));
    registry.declare(Arc::new(ContainersConfig));
    registry.declare(Arc::new(NullConfig));
    registry.declare(Arc::new(DocumentGeometryConfig));
    registry
}

/// Runtime square: both members are scalars
pub struct SquareValue {
    pub a: i32,
    pub b: i32,
}

impl GraphValue for SquareValue {
    fn runtime_type(&self) -> TypeKey {
        geometry::square()
    }

    fn member(&self, name: &str) -> Option<ValueView<'_>> {
        match name {
            "a" | "b" => Some(ValueView::Leaf(builtin::int32())),
            _ => None,
        }
    }
}

/// Runtime canvas whose `primary` member holds any shape-like value
pub struct CanvasValue {
    pub title: String,
    pub primary: Box<dyn GraphValue + Send + Sync>,
}

impl GraphValue for CanvasValue {
    fn runtime_type(&self) -> TypeKey {
        geometry::canvas()
    }

    fn member(&self, name: &str) -> Option<ValueView<'_>> {
        match name {
            "title" => Some(ValueView::Leaf(builtin::string())),
            "primary" => Some(ValueView::Node(self.primary.as_ref())),
            _ => None,
        }
    }
}

/// A runtime value whose type exists nowhere in the fixture universe
pub struct UnknownValue;

impl GraphValue for UnknownValue {
    fn runtime_type(&self) -> TypeKey {
        TypeKey::new("geometry.Pentagon")
    }

    fn member(&self, _name: &str) -> Option<ValueView<'_>> {
        None
    }
}

/// Self-referential node value for cyclic-graph walks
pub struct NodeValue {
    pub label: String,
    pub children: Vec<NodeValue>,
}

impl GraphValue for NodeValue {
    fn runtime_type(&self) -> TypeKey {
        TypeKey::new("graph.Node")
    }

    fn member(&self, name: &str) -> Option<ValueView<'_>> {
        match name {
            "label" => Some(ValueView::Leaf(builtin::string())),
            "children" => Some(ValueView::Items(
                self.children.iter().map(|c| ValueView::Node(c)).collect(),
            )),
            _ => None,
        }
    }
}
