//! Validated type registry
//!
//! [`TypeRegistryBuilder`] collects descriptors; [`TypeRegistryBuilder::build`]
//! checks that every reference resolves, computes transitive ancestors and
//! copies inherited members into each subtype.

use crate::descriptor::{Type, TypeDescriptor};
use crate::error::ReflectError;
use crate::types::{CollectionKind, PrimitiveKind, TypeRef};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Names registered by [`TypeRegistry::builder`] before any user type
pub const BUILTIN_NAMES: [&str; 4] = ["Object", "Number", "Enum", "String"];

/// Immutable set of resolvable types
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: IndexMap<String, Type>,
}

impl TypeRegistry {
    /// Builder pre-populated with primitives, boxed types, `String`,
    /// `Object`, `Number`, `Enum` and the container interfaces
    #[must_use]
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::with_builtins()
    }

    /// Registry holding only the built-in types
    ///
    /// The built-ins reference nothing outside themselves, so they are frozen
    /// without the validation pass of [`TypeRegistryBuilder::build`].
    #[must_use]
    pub fn builtin() -> Self {
        let by_name: IndexMap<String, TypeDescriptor> = TypeRegistryBuilder::with_builtins()
            .descriptors
            .into_iter()
            .map(|descriptor| (descriptor.name().to_string(), descriptor))
            .collect();
        freeze(&by_name)
    }

    /// Look up a registered type by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    /// Check if a name is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Resolve a reference, synthesizing array types
    ///
    /// # Errors
    /// Returns [`ReflectError::UnknownType`] if the base name is unregistered
    pub fn resolve(&self, type_ref: &TypeRef) -> Result<Type, ReflectError> {
        match type_ref {
            TypeRef::Named(name) => self
                .types
                .get(name)
                .cloned()
                .ok_or_else(|| ReflectError::UnknownType(name.clone())),
            TypeRef::Array(element) => Ok(Type::array_of(&self.resolve(element)?)),
        }
    }

    /// Number of registered types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over types in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Type> {
        self.types.values()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Collects descriptors for a [`TypeRegistry`]
#[derive(Debug, Default)]
pub struct TypeRegistryBuilder {
    descriptors: Vec<TypeDescriptor>,
}

impl TypeRegistryBuilder {
    /// Create empty builder without built-in types
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_builtins() -> Self {
        let mut builder = Self::new()
            .register(TypeDescriptor::class("Object").default_constructor())
            .register(TypeDescriptor::abstract_class("Number"))
            .register(TypeDescriptor::abstract_class("Enum"))
            .register(TypeDescriptor::string());
        for kind in PrimitiveKind::ALL {
            builder = builder
                .register(TypeDescriptor::primitive(kind))
                .register(TypeDescriptor::boxed(kind));
        }
        for kind in CollectionKind::ALL {
            builder = builder.register(TypeDescriptor::collection(kind));
        }
        builder
    }

    /// Add a descriptor
    #[must_use]
    pub fn register(mut self, descriptor: TypeDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Validate and freeze
    ///
    /// # Errors
    /// - [`ReflectError::DuplicateType`] if a name is registered twice
    /// - [`ReflectError::DanglingReference`] if a member or supertype names an
    ///   unregistered type
    pub fn build(self) -> Result<TypeRegistry, ReflectError> {
        let mut by_name: IndexMap<String, TypeDescriptor> = IndexMap::new();
        for descriptor in self.descriptors {
            let name = descriptor.name().to_string();
            if by_name.contains_key(&name) {
                return Err(ReflectError::DuplicateType(name));
            }
            by_name.insert(name, descriptor);
        }

        for descriptor in by_name.values() {
            let supertypes = descriptor.supertypes().iter().map(String::as_str);
            let members = descriptor.type_refs().map(TypeRef::base_name);
            for missing in supertypes.chain(members) {
                if !by_name.contains_key(missing) {
                    return Err(ReflectError::DanglingReference {
                        owner: descriptor.name().to_string(),
                        missing: missing.to_string(),
                    });
                }
            }
        }

        Ok(freeze(&by_name))
    }
}

/// Compute ancestors and inherited members for every descriptor
fn freeze(by_name: &IndexMap<String, TypeDescriptor>) -> TypeRegistry {
    let mut types = IndexMap::with_capacity(by_name.len());
    for (name, declared) in by_name {
        let lineage = lineage(by_name, declared);
        let mut descriptor = declared.clone();
        inherit_members(&mut descriptor, by_name, &lineage);
        descriptor.ancestors = lineage.into_iter().collect();
        if name != "Object" {
            descriptor.ancestors.insert("Object".to_string());
        }
        types.insert(name.clone(), Type::new(descriptor));
    }
    TypeRegistry { types }
}

/// Ancestors in breadth-first order, nearest first, without duplicates
fn lineage(by_name: &IndexMap<String, TypeDescriptor>, declared: &TypeDescriptor) -> Vec<String> {
    let name = declared.name();
    let mut seen = BTreeSet::new();
    let mut order = Vec::new();
    let mut queue: Vec<&str> = declared.supertypes().iter().map(String::as_str).collect();
    while !queue.is_empty() {
        let current = queue.remove(0);
        if current == name || !seen.insert(current.to_string()) {
            continue;
        }
        order.push(current.to_string());
        if let Some(parent) = by_name.get(current) {
            queue.extend(parent.supertypes().iter().map(String::as_str));
        }
    }
    order
}

fn inherit_members(
    descriptor: &mut TypeDescriptor,
    by_name: &IndexMap<String, TypeDescriptor>,
    lineage: &[String],
) {
    for ancestor in lineage.iter().filter_map(|name| by_name.get(name)) {
        for method in ancestor.methods() {
            let overridden = descriptor
                .methods
                .iter()
                .any(|m| m.name() == method.name() && m.params() == method.params());
            if !overridden {
                descriptor.methods.push(method.clone());
            }
        }
        for field in ancestor.fields() {
            if descriptor.field(field.name()).is_none() {
                descriptor.fields.push(field.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeKind;
    use proptest::prelude::*;

    #[test]
    fn builtin_matches_validated_build() {
        let frozen = TypeRegistry::builtin();
        let validated = TypeRegistry::builder().build().unwrap();
        let names = |registry: &TypeRegistry| -> Vec<String> {
            registry.iter().map(|ty| ty.name().to_string()).collect()
        };
        assert_eq!(names(&frozen), names(&validated));
        assert!(frozen.get("Long").unwrap().is_assignable_to("Number"));
    }

    #[test]
    fn builtins_resolve() {
        let registry = TypeRegistry::builtin();
        for name in BUILTIN_NAMES {
            assert!(registry.contains(name), "missing {name}");
        }
        assert!(registry.contains("int"));
        assert!(registry.contains("Integer"));
        assert!(registry.contains("List"));
    }

    #[test]
    fn boxed_numbers_are_numbers() {
        let registry = TypeRegistry::builtin();
        let integer = registry.get("Integer").unwrap();
        assert!(integer.is_assignable_to("Number"));
        assert!(integer.is_assignable_to("Object"));
        assert!(!registry.get("Boolean").unwrap().is_assignable_to("Number"));
        assert!(!registry.get("int").unwrap().is_assignable_to("Number"));
    }

    #[test]
    fn arrays_are_synthesized() {
        let registry = TypeRegistry::builtin();
        let ty = registry.resolve(&TypeRef::array_of("int")).unwrap();
        assert_eq!(ty.name(), "int[]");
        assert!(matches!(ty.kind(), TypeKind::Array(_)));
        assert_eq!(ty.element().unwrap().name(), "int");
    }

    #[test]
    fn unknown_type() {
        let registry = TypeRegistry::builtin();
        assert_eq!(
            registry.resolve(&TypeRef::named("Ghost")).unwrap_err(),
            ReflectError::UnknownType("Ghost".to_string())
        );
    }

    #[test]
    fn duplicate_rejected() {
        let err = TypeRegistry::builder()
            .register(TypeDescriptor::class("A"))
            .register(TypeDescriptor::class("A"))
            .build()
            .unwrap_err();
        assert_eq!(err, ReflectError::DuplicateType("A".to_string()));
    }

    #[test]
    fn dangling_reference_rejected() {
        let err = TypeRegistry::builder()
            .register(TypeDescriptor::class("A").property("b", "B"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ReflectError::DanglingReference { ref missing, .. } if missing == "B"));
    }

    #[test]
    fn mutual_references_allowed() {
        let registry = TypeRegistry::builder()
            .register(TypeDescriptor::class("A").default_constructor().property("b", "B"))
            .register(TypeDescriptor::class("B").default_constructor().property("a", "A"))
            .build()
            .unwrap();
        assert!(registry.contains("A"));
        assert!(registry.contains("B"));
    }

    #[test]
    fn transitive_ancestors_and_inherited_members() {
        let registry = TypeRegistry::builder()
            .register(TypeDescriptor::abstract_class("Shape").property("name", TypeRef::string()))
            .register(TypeDescriptor::class("Polygon").extends("Shape").property("sides", TypeRef::int()))
            .register(TypeDescriptor::class("Square").extends("Polygon").default_constructor())
            .build()
            .unwrap();

        let square = registry.get("Square").unwrap();
        assert!(square.is_assignable_to("Shape"));
        assert!(square.is_assignable_to("Polygon"));
        assert!(square.method("setName", 1).is_some());
        assert!(square.method("setSides", 1).is_some());
        assert!(square.field("sides").is_some());
    }

    #[test]
    fn enum_extends_enum() {
        let registry = TypeRegistry::builder()
            .register(TypeDescriptor::enumeration("Color", ["RED", "GREEN"]))
            .build()
            .unwrap();
        let color = registry.get("Color").unwrap();
        assert!(color.is_assignable_to("Enum"));
        assert_eq!(color.enum_constants(), ["RED", "GREEN"]);
    }

    /// Supertype edges pointing only at lower indices, so the graph is acyclic
    fn hierarchy() -> impl Strategy<Value = Vec<Vec<usize>>> {
        (1_usize..8).prop_flat_map(|count| {
            (0..count)
                .map(|index| proptest::sample::subsequence((0..index).collect::<Vec<_>>(), 0..=index))
                .collect::<Vec<_>>()
        })
    }

    fn closure(edges: &[Vec<usize>], index: usize) -> BTreeSet<usize> {
        let mut reached = BTreeSet::new();
        let mut pending = edges[index].clone();
        while let Some(next) = pending.pop() {
            if reached.insert(next) {
                pending.extend(&edges[next]);
            }
        }
        reached
    }

    proptest! {
        #[test]
        fn ancestors_are_the_transitive_closure(edges in hierarchy()) {
            let name = |index: usize| format!("T{index}");
            let registry = edges
                .iter()
                .enumerate()
                .fold(TypeRegistry::builder(), |builder, (index, supers)| {
                    let descriptor = supers
                        .iter()
                        .fold(TypeDescriptor::class(name(index)), |d, s| d.extends(name(*s)));
                    builder.register(descriptor)
                })
                .build()
                .unwrap();

            for index in 0..edges.len() {
                let ty = registry.get(&name(index)).unwrap();
                let expected = closure(&edges, index);
                prop_assert!(ty.is_assignable_to("Object"));
                for other in 0..edges.len() {
                    let assignable = other == index || expected.contains(&other);
                    prop_assert_eq!(ty.is_assignable_to(&name(other)), assignable);
                }
            }
        }
    }
}
