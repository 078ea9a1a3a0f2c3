//! Type descriptors and member metadata
//!
//! A [`TypeDescriptor`] is the read-only view the engine classifies and
//! populates: constructors, public methods, fields and structural kind.
//! Member bodies are closures over the dynamic object model, so invoking a
//! discovered member is a real call that can fail.
//!
//! # Example
//!
//! ```rust
//! use blueprint_reflect::{TypeDescriptor, TypeRef};
//!
//! let person = TypeDescriptor::class("Person")
//!     .default_constructor()
//!     .property("name", TypeRef::string())
//!     .property("age", TypeRef::int());
//!
//! assert_eq!(person.methods().len(), 4);
//! ```

use crate::error::InvocationError;
use crate::types::{CollectionKind, PrimitiveKind, TypeKind, TypeRef, Visibility};
use crate::value::{ObjectRef, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Constructor implementation
pub type ConstructorBody = Arc<dyn Fn(&[Value]) -> Result<Value, InvocationError> + Send + Sync>;

/// Method implementation, receiving the target instance
pub type MethodBody =
    Arc<dyn Fn(&Value, &[Value]) -> Result<Value, InvocationError> + Send + Sync>;

/// Resolved type handle
///
/// Cheap to clone. Identity, equality and hashing are by name.
#[derive(Clone)]
pub struct Type(Arc<TypeDescriptor>);

impl Type {
    pub(crate) fn new(descriptor: TypeDescriptor) -> Self {
        Self(Arc::new(descriptor))
    }

    /// Synthesize the array type of `element`
    #[must_use]
    pub fn array_of(element: &Type) -> Self {
        let mut descriptor = TypeDescriptor::new(
            format!("{}[]", element.name()),
            TypeKind::Array(element.clone()),
        );
        descriptor.ancestors.insert("Object".to_string());
        Self::new(descriptor)
    }

    /// Element type if this is an array
    #[must_use]
    pub fn element(&self) -> Option<&Type> {
        match self.kind() {
            TypeKind::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Reference to this type
    #[must_use]
    pub fn to_type_ref(&self) -> TypeRef {
        match self.element() {
            Some(element) => TypeRef::array_of(element.to_type_ref()),
            None => TypeRef::named(self.name()),
        }
    }
}

impl Deref for Type {
    type Target = TypeDescriptor;

    fn deref(&self) -> &TypeDescriptor {
        &self.0
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.name())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Abstract view of a type
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    supertypes: Vec<String>,
    pub(crate) ancestors: BTreeSet<String>,
    constructors: Vec<ConstructorDescriptor>,
    pub(crate) methods: Vec<MethodDescriptor>,
    pub(crate) fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            supertypes: Vec::new(),
            ancestors: BTreeSet::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Concrete class with no members yet
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Concrete)
    }

    /// Abstract class
    #[must_use]
    pub fn abstract_class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Abstract)
    }

    /// Interface; instances are proxies
    #[must_use]
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    /// Enumeration with constants in declaration order
    #[must_use]
    pub fn enumeration<I, S>(name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let constants = constants.into_iter().map(Into::into).collect();
        Self::new(name, TypeKind::Enum { constants }).extends("Enum")
    }

    pub(crate) fn primitive(kind: PrimitiveKind) -> Self {
        Self::new(kind.primitive_name(), TypeKind::Primitive(kind))
    }

    pub(crate) fn boxed(kind: PrimitiveKind) -> Self {
        let descriptor = Self::new(kind.boxed_name(), TypeKind::Boxed(kind));
        if kind.is_numeric() {
            descriptor.extends("Number")
        } else {
            descriptor
        }
    }

    pub(crate) fn string() -> Self {
        Self::new("String", TypeKind::String)
    }

    pub(crate) fn collection(kind: CollectionKind) -> Self {
        let descriptor = Self::new(kind.type_name(), TypeKind::Collection(kind));
        match kind {
            CollectionKind::List | CollectionKind::Set => descriptor.implements("Collection"),
            CollectionKind::Collection | CollectionKind::Map => descriptor,
        }
    }

    /// Type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Structural kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Direct supertypes as declared
    #[inline]
    #[must_use]
    pub fn supertypes(&self) -> &[String] {
        &self.supertypes
    }

    /// Declared constructors in declaration order
    #[inline]
    #[must_use]
    pub fn constructors(&self) -> &[ConstructorDescriptor] {
        &self.constructors
    }

    /// Declared and inherited methods
    #[inline]
    #[must_use]
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Declared and inherited fields
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Enum constants, empty for non-enums
    #[must_use]
    pub fn enum_constants(&self) -> &[String] {
        match &self.kind {
            TypeKind::Enum { constants } => constants,
            _ => &[],
        }
    }

    /// Whether this type is `name` or a subtype/implementor of it
    #[must_use]
    pub fn is_assignable_to(&self, name: &str) -> bool {
        self.name == name || self.ancestors.contains(name)
    }

    /// Whether this is an unboxed primitive
    #[inline]
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(_))
    }

    /// Whether this is an array type
    #[inline]
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array(_))
    }

    /// Find a method by name and parameter count
    #[must_use]
    pub fn method(&self, name: &str, arity: usize) -> Option<&MethodDescriptor> {
        self.methods
            .iter()
            .find(|m| m.name() == name && m.params().len() == arity)
    }

    /// Find the first overload of `name` whose parameters accept `args`
    #[must_use]
    pub fn method_for(&self, name: &str, args: &[Value]) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name() == name && m.accepts(args))
    }

    /// Find a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Declare a direct superclass
    #[must_use]
    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    /// Declare an implemented interface
    #[must_use]
    pub fn implements(self, interface: impl Into<String>) -> Self {
        self.extends(interface)
    }

    /// Add a public no-argument constructor
    #[must_use]
    pub fn default_constructor(mut self) -> Self {
        let type_name = self.name.clone();
        self.constructors.push(ConstructorDescriptor::new(
            &self.name,
            Vec::new(),
            Arc::new(move |_| Ok(Value::Object(ObjectRef::new(type_name.clone())))),
        ));
        self
    }

    /// Add a public constructor storing each argument into the field of the
    /// same name
    #[must_use]
    pub fn constructor<I, S, T>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<TypeRef>,
    {
        let params: Vec<Parameter> = params
            .into_iter()
            .map(|(name, ty)| Parameter::new(name, ty))
            .collect();
        let names: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
        let type_name = self.name.clone();
        let body: ConstructorBody = Arc::new(move |args| {
            let obj = ObjectRef::new(type_name.clone());
            for (name, arg) in names.iter().zip(args) {
                obj.set(name.clone(), arg.clone());
            }
            Ok(Value::Object(obj))
        });
        self.constructors
            .push(ConstructorDescriptor::new(&self.name, params, body));
        self
    }

    /// Add a constructor with a custom body
    #[must_use]
    pub fn constructor_with(mut self, constructor: ConstructorDescriptor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Add a private field with a public `setX` setter and `getX` getter
    #[must_use]
    pub fn property(mut self, name: &str, ty: impl Into<TypeRef>) -> Self {
        let ty = ty.into();
        self.fields
            .push(FieldDescriptor::new(&self.name, name, ty.clone()).with_visibility(Visibility::Private));
        self.methods
            .push(MethodDescriptor::setter(&self.name, name, ty.clone()));
        self.methods.push(MethodDescriptor::getter(&self.name, name, ty));
        self
    }

    /// Add a private field exposed only through a `getX` getter
    #[must_use]
    pub fn read_only(mut self, name: &str, ty: impl Into<TypeRef>) -> Self {
        let ty = ty.into();
        self.fields
            .push(FieldDescriptor::new(&self.name, name, ty.clone()).with_visibility(Visibility::Private));
        self.methods.push(MethodDescriptor::getter(&self.name, name, ty));
        self
    }

    /// Add a fluent method that stores its argument and returns the receiver
    #[must_use]
    pub fn fluent(mut self, name: &str, ty: impl Into<TypeRef>) -> Self {
        let ty = ty.into();
        self.fields
            .push(FieldDescriptor::new(&self.name, name, ty.clone()).with_visibility(Visibility::Private));
        self.methods.push(MethodDescriptor::fluent(&self.name, name, ty));
        self
    }

    /// Add a field
    #[must_use]
    pub fn field_with(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a public, mutable field
    #[must_use]
    pub fn public_field(self, name: &str, ty: impl Into<TypeRef>) -> Self {
        let field = FieldDescriptor::new(&self.name, name, ty);
        self.field_with(field)
    }

    /// Add a method
    #[must_use]
    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Add an abstract accessor `name()` returning `ty`
    #[must_use]
    pub fn accessor(mut self, name: &str, ty: impl Into<TypeRef>) -> Self {
        let method = MethodDescriptor::new(&self.name, name)
            .returns(ty)
            .without_body();
        self.methods.push(method);
        self
    }

    pub(crate) fn type_refs(&self) -> impl Iterator<Item = &TypeRef> {
        self.constructors
            .iter()
            .flat_map(|c| c.params.iter().map(|p| &p.ty))
            .chain(
                self.methods
                    .iter()
                    .flat_map(|m| m.params.iter().chain(m.returns.iter())),
            )
            .chain(self.fields.iter().map(|f| &f.ty))
    }
}

/// Named constructor parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub ty: TypeRef,
}

impl Parameter {
    /// Create parameter
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// Constructor metadata and body
#[derive(Clone)]
pub struct ConstructorDescriptor {
    declaring: String,
    params: Vec<Parameter>,
    visibility: Visibility,
    body: ConstructorBody,
}

impl ConstructorDescriptor {
    /// Create public constructor
    #[must_use]
    pub fn new(declaring: &str, params: Vec<Parameter>, body: ConstructorBody) -> Self {
        Self {
            declaring: declaring.to_string(),
            params,
            visibility: Visibility::Public,
            body,
        }
    }

    /// Set visibility
    #[inline]
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Ordered parameters
    #[inline]
    #[must_use]
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Whether the engine may call this constructor
    #[inline]
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Call the constructor
    ///
    /// # Errors
    /// Returns error on arity mismatch or if the body fails
    pub fn invoke(&self, args: &[Value]) -> Result<Value, InvocationError> {
        if args.len() != self.params.len() {
            return Err(InvocationError::ArityMismatch {
                member: self.to_string(),
                expected: self.params.len(),
                actual: args.len(),
            });
        }
        (self.body)(args)
    }
}

impl fmt::Display for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.ty.to_string()).collect();
        write!(f, "{}({})", self.declaring, params.join(", "))
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("signature", &self.to_string())
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}

/// Method metadata and optional body
#[derive(Clone)]
pub struct MethodDescriptor {
    declaring: String,
    name: String,
    params: Vec<TypeRef>,
    returns: Option<TypeRef>,
    is_static: bool,
    visibility: Visibility,
    body: Option<MethodBody>,
}

impl MethodDescriptor {
    /// Public, void, no-argument instance method with a no-op body
    #[must_use]
    pub fn new(declaring: &str, name: &str) -> Self {
        Self {
            declaring: declaring.to_string(),
            name: name.to_string(),
            params: Vec::new(),
            returns: None,
            is_static: false,
            visibility: Visibility::Public,
            body: Some(Arc::new(|_, _| Ok(Value::Null))),
        }
    }

    /// Classic `setX(value)` setter writing field `field`
    #[must_use]
    pub fn setter(declaring: &str, field: &str, ty: TypeRef) -> Self {
        let field_name = field.to_string();
        Self::new(declaring, &format!("set{}", capitalize(field)))
            .param(ty)
            .body(Arc::new(move |receiver, args| {
                store(receiver, &field_name, args)?;
                Ok(Value::Null)
            }))
    }

    /// `getX()` getter reading field `field`
    #[must_use]
    pub fn getter(declaring: &str, field: &str, ty: TypeRef) -> Self {
        let field_name = field.to_string();
        Self::new(declaring, &format!("get{}", capitalize(field)))
            .returns(ty)
            .body(Arc::new(move |receiver, _| {
                let obj = object(receiver, &field_name)?;
                Ok(obj.get(&field_name).unwrap_or(Value::Null))
            }))
    }

    /// Fluent `x(value)` storing field `field` and returning the receiver
    #[must_use]
    pub fn fluent(declaring: &str, field: &str, ty: TypeRef) -> Self {
        let field_name = field.to_string();
        Self::new(declaring, field)
            .param(ty)
            .returns(TypeRef::named(declaring))
            .body(Arc::new(move |receiver, args| {
                store(receiver, &field_name, args)?;
                Ok(receiver.clone())
            }))
    }

    /// Append a parameter
    #[inline]
    #[must_use]
    pub fn param(mut self, ty: impl Into<TypeRef>) -> Self {
        self.params.push(ty.into());
        self
    }

    /// Set the return type
    #[inline]
    #[must_use]
    pub fn returns(mut self, ty: impl Into<TypeRef>) -> Self {
        self.returns = Some(ty.into());
        self
    }

    /// Mark as static
    #[inline]
    #[must_use]
    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Set visibility
    #[inline]
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Replace the body
    #[inline]
    #[must_use]
    pub fn body(mut self, body: MethodBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Remove the body, making the method abstract
    #[inline]
    #[must_use]
    pub fn without_body(mut self) -> Self {
        self.body = None;
        self
    }

    /// Method name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declaring type name
    #[inline]
    #[must_use]
    pub fn declaring(&self) -> &str {
        &self.declaring
    }

    /// Parameter types
    #[inline]
    #[must_use]
    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    /// Return type, `None` for void
    #[inline]
    #[must_use]
    pub fn return_type(&self) -> Option<&TypeRef> {
        self.returns.as_ref()
    }

    /// Whether the method returns its declaring type
    #[must_use]
    pub fn returns_self(&self) -> bool {
        matches!(&self.returns, Some(TypeRef::Named(name)) if *name == self.declaring)
    }

    /// Whether the method is static
    #[inline]
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Whether the method is public
    #[inline]
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Whether the method has no body
    #[inline]
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.body.is_none()
    }

    /// Whether `args` match the parameter list in count and shape
    #[must_use]
    pub fn accepts(&self, args: &[Value]) -> bool {
        self.params.len() == args.len()
            && self.params.iter().zip(args).all(|(param, arg)| arg.fits(param))
    }

    /// Stable key identifying name and parameter types
    #[must_use]
    pub fn signature_key(&self) -> String {
        let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        format!("{}({})", self.name, params.join(","))
    }

    /// Call the method on `receiver`
    ///
    /// Methods without a body are dispatched through the receiver's proxy.
    ///
    /// # Errors
    /// Returns error on arity mismatch, missing body, or body failure
    pub fn invoke(&self, receiver: &Value, args: &[Value]) -> Result<Value, InvocationError> {
        if args.len() != self.params.len() {
            return Err(InvocationError::ArityMismatch {
                member: self.to_string(),
                expected: self.params.len(),
                actual: args.len(),
            });
        }
        match (&self.body, receiver) {
            (Some(body), _) => body(receiver, args),
            (None, Value::Proxy(proxy)) => proxy.invoke(&self.name, args),
            (None, _) => Err(InvocationError::MissingBody(self.to_string())),
        }
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        write!(f, "{}.{}({})", self.declaring, self.name, params.join(", "))
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("signature", &self.to_string())
            .field("returns", &self.returns)
            .field("is_static", &self.is_static)
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}

/// Field metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    declaring: String,
    name: String,
    ty: TypeRef,
    visibility: Visibility,
    is_static: bool,
    is_final: bool,
}

impl FieldDescriptor {
    /// Public, mutable instance field
    #[must_use]
    pub fn new(declaring: &str, name: &str, ty: impl Into<TypeRef>) -> Self {
        Self {
            declaring: declaring.to_string(),
            name: name.to_string(),
            ty: ty.into(),
            visibility: Visibility::Public,
            is_static: false,
            is_final: false,
        }
    }

    /// Set visibility
    #[inline]
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as static
    #[inline]
    #[must_use]
    pub fn static_field(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as final
    #[inline]
    #[must_use]
    pub fn final_field(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field type
    #[inline]
    #[must_use]
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    /// Whether public
    #[inline]
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Whether static
    #[inline]
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Whether final
    #[inline]
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Assign the field on an object
    ///
    /// # Errors
    /// Returns error if the field is final or the receiver is not an object
    pub fn set(&self, receiver: &Value, value: Value) -> Result<(), InvocationError> {
        if self.is_final {
            return Err(InvocationError::FinalField(self.to_string()));
        }
        let obj = object(receiver, &self.to_string())?;
        obj.set(self.name.clone(), value);
        Ok(())
    }

    /// Read the field from an object
    ///
    /// # Errors
    /// Returns error if the receiver is not an object
    pub fn get(&self, receiver: &Value) -> Result<Value, InvocationError> {
        let obj = object(receiver, &self.to_string())?;
        Ok(obj.get(&self.name).unwrap_or(Value::Null))
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring, self.name)
    }
}

fn object<'a>(receiver: &'a Value, member: &str) -> Result<&'a ObjectRef, InvocationError> {
    receiver
        .as_object()
        .ok_or_else(|| InvocationError::InvalidReceiver {
            member: member.to_string(),
            found: receiver.kind_name(),
        })
}

fn store(receiver: &Value, field: &str, args: &[Value]) -> Result<(), InvocationError> {
    let obj = object(receiver, field)?;
    let value = args.first().cloned().unwrap_or(Value::Null);
    obj.set(field, value);
    Ok(())
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
