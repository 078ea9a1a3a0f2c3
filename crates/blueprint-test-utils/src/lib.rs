//! Testing utilities for the Blueprint workspace
//!
//! Shared fixture type universe and tracing setup.

#![allow(missing_docs)]

use blueprint_reflect::{
    ConstructorDescriptor, FieldDescriptor, InvocationError, MethodDescriptor, TypeDescriptor,
    TypeRef, TypeRegistry, Visibility,
};
use std::sync::{Arc, Once};

pub const COLOR: &str = "Color";
pub const VACANT: &str = "Vacant";
pub const ADDRESS: &str = "Address";
pub const PERSON: &str = "Person";
pub const POINT: &str = "Point";
pub const PARENT: &str = "Parent";
pub const CHILD: &str = "Child";
pub const GREETER: &str = "Greeter";
pub const COUNTER: &str = "Counter";
pub const SHAPE: &str = "Shape";
pub const CIRCLE: &str = "Circle";
pub const SINGLETON: &str = "Singleton";
pub const PERSON_BUILDER: &str = "PersonBuilder";
pub const EXPLODING: &str = "Exploding";
pub const ROSTER: &str = "Roster";
pub const OFFICE: &str = "Office";
pub const INVENTORY: &str = "Inventory";
pub const CATALOG: &str = "Catalog";
pub const HEN: &str = "Hen";
pub const EGG: &str = "Egg";

static TRACING: Once = Once::new();

/// Install a test-friendly subscriber once per process
///
/// Honors `RUST_LOG`; defaults to `warn`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

pub fn color() -> TypeDescriptor {
    TypeDescriptor::enumeration(COLOR, ["RED", "GREEN", "BLUE"])
}

pub fn vacant() -> TypeDescriptor {
    TypeDescriptor::enumeration(VACANT, Vec::<String>::new())
}

pub fn address() -> TypeDescriptor {
    TypeDescriptor::class(ADDRESS)
        .default_constructor()
        .property("street", TypeRef::string())
        .property("city", TypeRef::string())
        .property("zip", TypeRef::int())
}

/// Bean with setters, a public field, a final field and a static field
pub fn person() -> TypeDescriptor {
    TypeDescriptor::class(PERSON)
        .default_constructor()
        .property("name", TypeRef::string())
        .property("age", TypeRef::int())
        .property("email", TypeRef::string())
        .property("color", COLOR)
        .property("address", ADDRESS)
        .public_field("nickname", TypeRef::string())
        .field_with(FieldDescriptor::new(PERSON, "id", TypeRef::long()).final_field())
        .field_with(FieldDescriptor::new(PERSON, "population", TypeRef::int()).static_field())
}

/// Immutable type built through `Point(int x, String label)`
pub fn point() -> TypeDescriptor {
    TypeDescriptor::class(POINT)
        .constructor([("x", TypeRef::int()), ("label", TypeRef::string())])
        .read_only("x", TypeRef::int())
        .read_only("label", TypeRef::string())
}

pub fn parent() -> TypeDescriptor {
    TypeDescriptor::class(PARENT)
        .default_constructor()
        .property("name", TypeRef::string())
        .property("child", CHILD)
}

pub fn child() -> TypeDescriptor {
    TypeDescriptor::class(CHILD)
        .default_constructor()
        .property("name", TypeRef::string())
        .property("parent", PARENT)
}

pub fn greeter() -> TypeDescriptor {
    TypeDescriptor::interface(GREETER)
        .accessor("name", TypeRef::string())
        .accessor("count", TypeRef::int())
        .accessor("color", COLOR)
        .with_method(
            MethodDescriptor::new(GREETER, "greet")
                .param(TypeRef::string())
                .returns(TypeRef::string())
                .without_body(),
        )
        .with_method(MethodDescriptor::new(GREETER, "close").without_body())
}

pub fn counter() -> TypeDescriptor {
    TypeDescriptor::interface(COUNTER).accessor("next", TypeRef::long())
}

pub fn shape() -> TypeDescriptor {
    TypeDescriptor::abstract_class(SHAPE)
}

pub fn circle() -> TypeDescriptor {
    TypeDescriptor::class(CIRCLE)
        .extends(SHAPE)
        .default_constructor()
        .property("radius", TypeRef::double())
}

/// Concrete type whose only constructor is private
pub fn singleton() -> TypeDescriptor {
    TypeDescriptor::class(SINGLETON).constructor_with(
        ConstructorDescriptor::new(
            SINGLETON,
            Vec::new(),
            Arc::new(|_| Err(InvocationError::failed("private constructor"))),
        )
        .with_visibility(Visibility::Private),
    )
}

pub fn person_builder() -> TypeDescriptor {
    TypeDescriptor::class(PERSON_BUILDER)
        .default_constructor()
        .fluent("name", TypeRef::string())
        .fluent("age", TypeRef::int())
}

/// Bean whose only setter fails when invoked
pub fn exploding() -> TypeDescriptor {
    TypeDescriptor::class(EXPLODING).default_constructor().with_method(
        MethodDescriptor::setter(EXPLODING, "fuse", TypeRef::int())
            .body(Arc::new(|_, _| Err(InvocationError::failed("fuse lit")))),
    )
}

pub fn roster() -> TypeDescriptor {
    TypeDescriptor::class(ROSTER)
        .default_constructor()
        .property("members", TypeRef::array_of(PERSON))
}

pub fn office() -> TypeDescriptor {
    TypeDescriptor::class(OFFICE)
        .default_constructor()
        .property("greeter", GREETER)
        .property("room", TypeRef::int())
}

pub fn inventory() -> TypeDescriptor {
    TypeDescriptor::class(INVENTORY)
        .default_constructor()
        .property("tags", "List")
        .property("ids", "Set")
        .property("counts", "Map")
}

/// Interface with `get` overloaded on its parameter type
pub fn catalog() -> TypeDescriptor {
    TypeDescriptor::interface(CATALOG)
        .with_method(
            MethodDescriptor::new(CATALOG, "get")
                .param(TypeRef::int())
                .returns(TypeRef::int())
                .without_body(),
        )
        .with_method(
            MethodDescriptor::new(CATALOG, "get")
                .param(TypeRef::string())
                .returns(TypeRef::string())
                .without_body(),
        )
}

/// Each requires the other as its only constructor argument
pub fn hen() -> TypeDescriptor {
    TypeDescriptor::class(HEN).constructor([("egg", EGG)])
}

pub fn egg() -> TypeDescriptor {
    TypeDescriptor::class(EGG).constructor([("hen", HEN)])
}

/// Every fixture descriptor, in dependency-agnostic order
pub fn descriptors() -> Vec<TypeDescriptor> {
    vec![
        color(),
        vacant(),
        address(),
        person(),
        point(),
        parent(),
        child(),
        greeter(),
        counter(),
        shape(),
        circle(),
        singleton(),
        person_builder(),
        exploding(),
        roster(),
        office(),
        inventory(),
        catalog(),
        hen(),
        egg(),
    ]
}

/// Registry holding the built-ins and every fixture type
///
/// # Panics
/// Panics if the fixture declarations are inconsistent
pub fn fixture_registry() -> TypeRegistry {
    descriptors()
        .into_iter()
        .fold(TypeRegistry::builder(), |builder, descriptor| {
            builder.register(descriptor)
        })
        .build()
        .expect("fixture types are consistent")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_build() {
        let registry = fixture_registry();
        for descriptor in descriptors() {
            assert!(registry.contains(descriptor.name()), "{}", descriptor.name());
        }
    }

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
