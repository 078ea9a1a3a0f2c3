//! Matching strategies
//!
//! A [`MatchingStrategy`] decides whether the creation strategy paired with
//! it applies to a candidate type, member name, method or field. Strategies
//! answer `false` for the questions they do not cover.

use crate::checks;
use crate::error::Result;
use blueprint_reflect::{FieldDescriptor, MethodDescriptor, PrimitiveKind, Type};
use std::fmt;

/// Conventional mutator prefix
pub const MUTATOR_PREFIX: &str = "set";

/// Type-name suffix marking fluent builders
pub const BUILDER_SUFFIX: &str = "Builder";

/// Predicate selecting a creation strategy
pub trait MatchingStrategy: Send + Sync + fmt::Debug {
    /// Candidate type
    fn matches_type(&self, _ty: &Type) -> bool {
        false
    }

    /// Candidate member name
    fn matches_name(&self, _name: &str) -> bool {
        false
    }

    /// Candidate method, by name unless overridden
    fn matches_method(&self, method: &MethodDescriptor) -> bool {
        self.matches_name(method.name())
    }

    /// Candidate field
    fn matches_field(&self, _field: &FieldDescriptor) -> bool {
        false
    }
}

/// Exact type match; boxed and unboxed spellings of a primitive are equal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMatcher {
    type_name: String,
    primitive: Option<PrimitiveKind>,
}

impl TypeMatcher {
    /// Match the type named `type_name`
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let primitive = PrimitiveKind::from_type_name(&type_name);
        Self {
            type_name,
            primitive,
        }
    }

    /// Match a primitive kind in either spelling
    #[must_use]
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::new(kind.primitive_name())
    }
}

impl MatchingStrategy for TypeMatcher {
    fn matches_type(&self, ty: &Type) -> bool {
        if ty.name() == self.type_name {
            return true;
        }
        match (self.primitive, ty.kind().primitive_kind()) {
            (Some(registered), Some(candidate)) => registered == candidate,
            _ => false,
        }
    }
}

/// Matches the registered type and every subtype or implementor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignableMatcher {
    type_name: String,
}

impl AssignableMatcher {
    /// Match `type_name` and its subtypes
    #[inline]
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

impl MatchingStrategy for AssignableMatcher {
    fn matches_type(&self, ty: &Type) -> bool {
        ty.is_assignable_to(&self.type_name)
    }
}

/// Matches any array type
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayMatcher;

impl MatchingStrategy for ArrayMatcher {
    fn matches_type(&self, ty: &Type) -> bool {
        ty.is_array()
    }
}

/// Case-insensitive member name match, also accepting the `set` spelling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMatcher {
    name: String,
    mutator: String,
}

impl NameMatcher {
    /// Match members named `name` or `set<name>`
    ///
    /// # Errors
    /// Returns [`crate::BlueprintError::InvalidArgument`] if `name` is blank
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        checks::require_non_empty(&name, "name")?;
        let mutator = format!("{MUTATOR_PREFIX}{name}");
        Ok(Self { name, mutator })
    }
}

impl MatchingStrategy for NameMatcher {
    fn matches_name(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case(&self.name) || name.eq_ignore_ascii_case(&self.mutator)
    }

    fn matches_field(&self, field: &FieldDescriptor) -> bool {
        self.matches_name(field.name())
    }
}

/// Matches single-argument mutators and assignable public fields
///
/// Recognized methods are public instance methods taking one argument that
/// are either `setX` returning void or the receiver type, or fluent methods
/// on a `*Builder` type returning the receiver type.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutatorMatcher;

impl MutatorMatcher {
    fn is_setter(method: &MethodDescriptor) -> bool {
        let name = method.name();
        name.len() > MUTATOR_PREFIX.len()
            && name.starts_with(MUTATOR_PREFIX)
            && (method.return_type().is_none() || method.returns_self())
    }

    fn is_builder_method(method: &MethodDescriptor) -> bool {
        method.declaring().ends_with(BUILDER_SUFFIX) && method.returns_self()
    }
}

impl MatchingStrategy for MutatorMatcher {
    fn matches_method(&self, method: &MethodDescriptor) -> bool {
        method.is_public()
            && !method.is_static()
            && method.params().len() == 1
            && (Self::is_setter(method) || Self::is_builder_method(method))
    }

    fn matches_field(&self, field: &FieldDescriptor) -> bool {
        field.is_public() && !field.is_static() && !field.is_final()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_reflect::{TypeDescriptor, TypeRef, TypeRegistry, Visibility};

    fn registry() -> TypeRegistry {
        TypeRegistry::builder()
            .register(TypeDescriptor::enumeration("Color", ["RED"]))
            .register(TypeDescriptor::abstract_class("Shape"))
            .register(TypeDescriptor::class("Circle").extends("Shape"))
            .build()
            .unwrap()
    }

    fn resolve(registry: &TypeRegistry, ty: impl Into<TypeRef>) -> Type {
        registry.resolve(&ty.into()).unwrap()
    }

    #[test]
    fn type_matcher_exact() {
        let registry = registry();
        let matcher = TypeMatcher::new("Circle");
        assert!(matcher.matches_type(&resolve(&registry, "Circle")));
        assert!(!matcher.matches_type(&resolve(&registry, "Shape")));
    }

    #[test]
    fn type_matcher_boxing() {
        let registry = registry();
        let boxed = TypeMatcher::new("Integer");
        assert!(boxed.matches_type(&resolve(&registry, "int")));
        assert!(boxed.matches_type(&resolve(&registry, "Integer")));
        assert!(!boxed.matches_type(&resolve(&registry, "long")));

        let unboxed = TypeMatcher::primitive(PrimitiveKind::Long);
        assert!(unboxed.matches_type(&resolve(&registry, "Long")));
    }

    #[test]
    fn assignable_matcher() {
        let registry = registry();
        let shapes = AssignableMatcher::new("Shape");
        assert!(shapes.matches_type(&resolve(&registry, "Circle")));
        assert!(shapes.matches_type(&resolve(&registry, "Shape")));

        let enums = AssignableMatcher::new("Enum");
        assert!(enums.matches_type(&resolve(&registry, "Color")));
        assert!(!enums.matches_type(&resolve(&registry, "Circle")));

        let numbers = AssignableMatcher::new("Number");
        assert!(numbers.matches_type(&resolve(&registry, "Double")));
    }

    #[test]
    fn array_matcher() {
        let registry = registry();
        assert!(ArrayMatcher.matches_type(&resolve(&registry, TypeRef::array_of("int"))));
        assert!(ArrayMatcher.matches_type(&resolve(&registry, TypeRef::array_of("Circle"))));
        assert!(!ArrayMatcher.matches_type(&resolve(&registry, "int")));
    }

    #[test]
    fn name_matcher_case_insensitive_with_setter() {
        let matcher = NameMatcher::new("email").unwrap();
        assert!(matcher.matches_name("email"));
        assert!(matcher.matches_name("EMAIL"));
        assert!(matcher.matches_name("setEmail"));
        assert!(!matcher.matches_name("getEmail"));

        let field = FieldDescriptor::new("Person", "Email", TypeRef::string());
        assert!(matcher.matches_field(&field));
    }

    #[test]
    fn name_matcher_ignores_types() {
        let registry = registry();
        assert!(!NameMatcher::new("int").unwrap().matches_type(&resolve(&registry, "int")));
    }

    #[test]
    fn name_matcher_rejects_blank_names() {
        assert!(NameMatcher::new("").unwrap_err().is_invalid_argument());
        assert!(NameMatcher::new(" \t").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn mutator_matcher_setters() {
        let setter = MethodDescriptor::setter("Person", "name", TypeRef::string());
        let getter = MethodDescriptor::getter("Person", "name", TypeRef::string());
        let bare_set = MethodDescriptor::new("Person", "set").param(TypeRef::int());
        let static_setter = MethodDescriptor::setter("Person", "count", TypeRef::int()).static_method();
        let private_setter = MethodDescriptor::setter("Person", "secret", TypeRef::int())
            .with_visibility(Visibility::Private);

        assert!(MutatorMatcher.matches_method(&setter));
        assert!(!MutatorMatcher.matches_method(&getter));
        assert!(!MutatorMatcher.matches_method(&bare_set));
        assert!(!MutatorMatcher.matches_method(&static_setter));
        assert!(!MutatorMatcher.matches_method(&private_setter));
    }

    #[test]
    fn mutator_matcher_fluent_builders() {
        let fluent = MethodDescriptor::fluent("PersonBuilder", "name", TypeRef::string());
        let not_builder = MethodDescriptor::fluent("Person", "name", TypeRef::string());
        let wrong_return = MethodDescriptor::new("PersonBuilder", "name")
            .param(TypeRef::string())
            .returns(TypeRef::string());

        assert!(MutatorMatcher.matches_method(&fluent));
        assert!(!MutatorMatcher.matches_method(&not_builder));
        assert!(!MutatorMatcher.matches_method(&wrong_return));
    }

    #[test]
    fn mutator_matcher_fields() {
        let open = FieldDescriptor::new("Person", "nickname", TypeRef::string());
        let frozen = FieldDescriptor::new("Person", "id", TypeRef::long()).final_field();
        let shared = FieldDescriptor::new("Person", "count", TypeRef::int()).static_field();
        let hidden = FieldDescriptor::new("Person", "secret", TypeRef::int())
            .with_visibility(Visibility::Private);

        assert!(MutatorMatcher.matches_field(&open));
        assert!(!MutatorMatcher.matches_field(&frozen));
        assert!(!MutatorMatcher.matches_field(&shared));
        assert!(!MutatorMatcher.matches_field(&hidden));
    }
}
