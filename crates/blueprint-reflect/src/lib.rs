//! Blueprint Reflection Layer
//!
//! Runtime type metadata and dynamic values consumed by the Blueprint
//! construction engine.
//!
//! # Core Concepts
//!
//! - [`TypeRef`]: Unresolved reference, by name or as an array of another reference
//! - [`Type`]: Resolved handle to a [`TypeDescriptor`], compared by name
//! - [`TypeKind`]: Structural classification (primitive, enum, array, interface, ...)
//! - [`ConstructorDescriptor`], [`MethodDescriptor`], [`FieldDescriptor`]: Invokable members
//! - [`Value`]: Dynamic value model, with [`Value::Null`] as the absent marker
//! - [`TypeRegistry`]: Validated set of types built through [`TypeRegistryBuilder`]
//!
//! # Example
//!
//! ```rust
//! use blueprint_reflect::{TypeDescriptor, TypeRef, TypeRegistry};
//!
//! let registry = TypeRegistry::builder()
//!     .register(
//!         TypeDescriptor::class("Address")
//!             .default_constructor()
//!             .property("street", TypeRef::string()),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let address = registry.resolve(&TypeRef::named("Address")).unwrap();
//! assert!(address.method("setStreet", 1).is_some());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod descriptor;
mod error;
mod registry;
mod types;
mod value;

// Re-exports
pub use descriptor::{
    ConstructorBody, ConstructorDescriptor, FieldDescriptor, MethodBody, MethodDescriptor,
    Parameter, Type, TypeDescriptor,
};
pub use error::{InvocationError, ReflectError};
pub use registry::{TypeRegistry, TypeRegistryBuilder, BUILTIN_NAMES};
pub use types::{CollectionKind, PrimitiveKind, TypeKind, TypeRef, Visibility};
pub use value::{ArrayValue, EnumConstant, FromValue, ObjectRef, ProxyObject, ProxyRef, Value};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
