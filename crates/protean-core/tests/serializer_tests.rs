//! Serializer facade tests
//!
//! Drives the whole engine through the public surface: a minimal
//! document codec behind [`FormatBackend`], fixture configurations, and the
//! facade's validate-then-delegate flow.

use protean_core::{
    BackendError, DecodedValue, FormatBackend, Payload, PayloadShape, Serializer,
    SerializerError, SerializerProfile, UnregisteredTypePolicy, WireFormat,
};
use protean_registry::{ConfigId, ConfigInstance};
use protean_test_utils::{fixture_registry, geometry, CanvasValue, SquareValue, UnknownValue};
use protean_types::{builtin, GraphValue, TypeKey, TypeUniverse, ValueView};
use std::sync::Arc;

/// Minimal document codec: renders member names from descriptors, decodes to
/// a raw JSON value. Enough to exercise the facade; real codecs live outside
/// the engine.
struct DocumentBackend {
    universe: Arc<TypeUniverse>,
}

impl DocumentBackend {
    fn render(&self, value: &dyn GraphValue) -> serde_json::Value {
        let key = value.runtime_type();
        let mut object = serde_json::Map::new();
        if let Some(descriptor) = self.universe.descriptor(&key) {
            for name in descriptor.member_names() {
                let rendered = match value.member(name) {
                    Some(view) => self.render_view(&view),
                    None => serde_json::Value::Null,
                };
                object.insert(name.to_string(), rendered);
            }
        }
        serde_json::Value::Object(object)
    }

    fn render_view(&self, view: &ValueView<'_>) -> serde_json::Value {
        match view {
            ValueView::Missing => serde_json::Value::Null,
            ValueView::Leaf(key) => serde_json::Value::String(key.to_string()),
            ValueView::Node(value) => self.render(*value),
            ValueView::Items(items) => {
                serde_json::Value::Array(items.iter().map(|i| self.render_view(i)).collect())
            }
            ValueView::Entries(entries) => serde_json::Value::Array(
                entries
                    .iter()
                    .map(|(k, v)| {
                        serde_json::Value::Array(vec![self.render_view(k), self.render_view(v)])
                    })
                    .collect(),
            ),
        }
    }
}

impl FormatBackend for DocumentBackend {
    fn format(&self) -> WireFormat {
        WireFormat::Document
    }

    fn encode(
        &self,
        value: &dyn GraphValue,
        _config: &ConfigInstance,
    ) -> Result<Vec<u8>, BackendError> {
        serde_json::to_vec(&self.render(value)).map_err(|e| BackendError::Encode(e.to_string()))
    }

    fn decode(
        &self,
        bytes: &[u8],
        _declared: &TypeKey,
        _config: &ConfigInstance,
    ) -> Result<DecodedValue, BackendError> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(Box::new(value))
    }
}

fn document_serializer(config: &str, policy: UnregisteredTypePolicy) -> Serializer {
    let registry = fixture_registry();
    let backend = Arc::new(DocumentBackend {
        universe: registry.universe().clone(),
    });
    Serializer::new(
        &registry,
        SerializerProfile::new(WireFormat::Document, ConfigId::new(config)),
        policy,
        backend,
    )
    .unwrap()
}

#[test]
fn test_serialize_then_deserialize_round_trips_through_the_backend() {
    let serializer = document_serializer("geometry", UnregisteredTypePolicy::Throw);
    let square = SquareValue { a: 2, b: 3 };

    let payload = serializer.serialize(&square).unwrap();
    assert_eq!(payload.profile, *serializer.profile());

    let decoded = serializer.deserialize(&payload, &geometry::square()).unwrap();
    let json = decoded.downcast::<serde_json::Value>().unwrap();
    assert!(json.get("a").is_some());
    assert!(json.get("b").is_some());
}

#[test]
fn test_equal_profiles_are_interchangeable() {
    let writer = document_serializer("geometry", UnregisteredTypePolicy::Throw);
    let reader = document_serializer("geometry", UnregisteredTypePolicy::Throw);
    assert_eq!(writer.profile(), reader.profile());

    let payload = writer.serialize(&SquareValue { a: 1, b: 1 }).unwrap();
    reader.deserialize(&payload, &geometry::square()).unwrap();
}

#[test]
fn test_profile_mismatch_is_rejected() {
    let writer = document_serializer("geometry", UnregisteredTypePolicy::Throw);
    let reader = document_serializer("graph", UnregisteredTypePolicy::Throw);

    let payload = writer.serialize(&SquareValue { a: 1, b: 1 }).unwrap();
    let err = reader
        .deserialize(&payload, &geometry::square())
        .unwrap_err();
    assert!(matches!(err, SerializerError::ProfileMismatch { .. }));
}

#[test]
fn test_backend_format_must_match_profile() {
    let registry = fixture_registry();
    let backend = Arc::new(DocumentBackend {
        universe: registry.universe().clone(),
    });
    let err = Serializer::new(
        &registry,
        SerializerProfile::new(WireFormat::Binary, ConfigId::new("geometry")),
        UnregisteredTypePolicy::Default,
        backend,
    )
    .unwrap_err();
    assert!(matches!(err, SerializerError::UnsupportedFormat(WireFormat::Binary)));
}

#[test]
fn test_unregistered_runtime_type_fails_under_throw() {
    let serializer = document_serializer("geometry", UnregisteredTypePolicy::Throw);
    let canvas = CanvasValue {
        title: "sketch".to_string(),
        primary: Box::new(UnknownValue),
    };
    let err = serializer.serialize(&canvas).unwrap_err();
    assert!(matches!(err, SerializerError::Validation(_)));
}

#[test]
fn test_permissive_configuration_defaults_to_no_enforcement() {
    let serializer = document_serializer("null", UnregisteredTypePolicy::Default);
    assert_eq!(serializer.policy(), UnregisteredTypePolicy::Attempt);

    // Nothing is registered under the null configuration, yet the validator
    // waves the graph through.
    serializer.serialize(&SquareValue { a: 1, b: 2 }).unwrap();
}

#[test]
fn test_closed_generic_jit_registration_end_to_end() {
    let serializer = document_serializer("containers", UnregisteredTypePolicy::Throw);
    let closed = TypeKey::generic("containers.Wrapper", [geometry::square()]);
    assert!(!serializer.config().is_registered(&closed));

    let payload = Payload {
        profile: serializer.profile().clone(),
        bytes: b"{}".to_vec(),
    };
    serializer.deserialize(&payload, &closed).unwrap();
    assert!(serializer.config().is_registered(&closed));
}

#[test]
fn test_container_declared_types_validate_their_arguments() {
    let serializer = document_serializer("geometry", UnregisteredTypePolicy::Throw);
    let payload = Payload {
        profile: serializer.profile().clone(),
        bytes: b"[]".to_vec(),
    };
    serializer
        .deserialize(&payload, &builtin::list(geometry::square()))
        .unwrap();

    let err = serializer
        .deserialize(&payload, &builtin::list(TypeKey::new("geometry.Pentagon")))
        .unwrap_err();
    assert!(matches!(err, SerializerError::Validation(_)));
}

#[test]
fn test_facade_resolver_handles_untagged_payloads() {
    let serializer = document_serializer("geometry", UnregisteredTypePolicy::Throw);
    let resolver = serializer.resolver();

    let resolved = resolver
        .resolve(
            &geometry::shape(),
            &PayloadShape::new(["a", "b"]),
            &mut |_: &TypeKey| Ok(()),
        )
        .unwrap();
    assert_eq!(resolved, geometry::square());
}

#[test]
fn test_serializer_over_composed_configuration() {
    // document-geometry registers nothing of its own; everything it can
    // serialize is inherited from the geometry dependency, with ownership
    // intact.
    let serializer = document_serializer("document-geometry", UnregisteredTypePolicy::Throw);
    assert_eq!(
        serializer.config().owner_of(&geometry::square()),
        Some(ConfigId::new("geometry"))
    );

    let payload = serializer.serialize(&SquareValue { a: 4, b: 5 }).unwrap();
    serializer.deserialize(&payload, &geometry::square()).unwrap();
}
