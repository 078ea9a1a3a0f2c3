//! Dynamic values produced by construction
//!
//! [`Value::Null`] is the absent marker. Objects are shared handles with
//! interior-mutable field storage so setters can run after instantiation.

use crate::descriptor::Type;
use crate::error::{InvocationError, ReflectError};
use crate::types::{PrimitiveKind, TypeKind, TypeRef};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Dynamically typed value
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value
    Null,
    /// `boolean`
    Bool(bool),
    /// `byte`
    Byte(i8),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// `char`
    Char(char),
    /// `String`
    Str(String),
    /// Enum constant
    Enum(EnumConstant),
    /// Array with its element type name
    Array(ArrayValue),
    /// List container
    List(Vec<Value>),
    /// Set container
    Set(Vec<Value>),
    /// Map container
    Map(Vec<(Value, Value)>),
    /// Class instance
    Object(ObjectRef),
    /// Interface proxy
    Proxy(ProxyRef),
}

impl Value {
    /// Zero value for primitives, absent for everything else
    #[must_use]
    pub fn zero_for(ty: &Type) -> Self {
        match ty.kind() {
            TypeKind::Primitive(kind) => Self::zero_of(*kind),
            _ => Self::Null,
        }
    }

    /// Zero value of a primitive kind
    #[must_use]
    pub fn zero_of(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Boolean => Self::Bool(false),
            PrimitiveKind::Byte => Self::Byte(0),
            PrimitiveKind::Short => Self::Short(0),
            PrimitiveKind::Integer => Self::Int(0),
            PrimitiveKind::Long => Self::Long(0),
            PrimitiveKind::Float => Self::Float(0.0),
            PrimitiveKind::Double => Self::Double(0.0),
            PrimitiveKind::Character => Self::Char('\0'),
        }
    }

    /// Kind label used in diagnostics
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Byte(_) => "byte",
            Self::Short(_) => "short",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Char(_) => "char",
            Self::Str(_) => "string",
            Self::Enum(_) => "enum",
            Self::Array(_) => "array",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
            Self::Proxy(_) => "proxy",
        }
    }

    /// Check for the absent marker
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this value can be passed for a parameter of type `param`
    ///
    /// Shapes are compared without a registry, so objects and proxies match
    /// any named type other than the built-in primitives, strings and
    /// containers.
    #[must_use]
    pub fn fits(&self, param: &TypeRef) -> bool {
        let name = match param {
            TypeRef::Array(element) => {
                return match self {
                    Self::Null => true,
                    Self::Array(array) => array.element == element.to_string(),
                    _ => false,
                };
            }
            TypeRef::Named(name) => name.as_str(),
        };
        if name == "Object" {
            return true;
        }
        let primitive = PrimitiveKind::from_type_name(name);
        match self {
            Self::Null => primitive.map_or(true, |kind| kind.boxed_name() == name),
            Self::Bool(_) => primitive == Some(PrimitiveKind::Boolean),
            Self::Byte(_) => primitive == Some(PrimitiveKind::Byte) || name == "Number",
            Self::Short(_) => primitive == Some(PrimitiveKind::Short) || name == "Number",
            Self::Int(_) => primitive == Some(PrimitiveKind::Integer) || name == "Number",
            Self::Long(_) => primitive == Some(PrimitiveKind::Long) || name == "Number",
            Self::Float(_) => primitive == Some(PrimitiveKind::Float) || name == "Number",
            Self::Double(_) => primitive == Some(PrimitiveKind::Double) || name == "Number",
            Self::Char(_) => primitive == Some(PrimitiveKind::Character),
            Self::Str(_) => name == "String",
            Self::Enum(constant) => constant.type_name == name,
            Self::Array(_) => false,
            Self::List(_) => matches!(name, "List" | "Collection"),
            Self::Set(_) => matches!(name, "Set" | "Collection"),
            Self::Map(_) => name == "Map",
            Self::Object(_) | Self::Proxy(_) => primitive.is_none() && !is_builtin_reference(name),
        }
    }

    /// Borrow string contents
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow object handle
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Borrow proxy handle
    #[must_use]
    pub fn as_proxy(&self) -> Option<&ProxyRef> {
        match self {
            Self::Proxy(proxy) => Some(proxy),
            _ => None,
        }
    }

    /// Borrow array contents
    #[must_use]
    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Borrow enum constant
    #[must_use]
    pub fn as_enum(&self) -> Option<&EnumConstant> {
        match self {
            Self::Enum(constant) => Some(constant),
            _ => None,
        }
    }

    /// Read a field from an object value
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Value> {
        self.as_object().and_then(|obj| obj.get(name))
    }

    /// Call a method on a proxy value
    ///
    /// # Errors
    /// Returns error if the value is not a proxy or dispatch fails
    pub fn call(&self, method: &str, args: &[Value]) -> Result<Value, InvocationError> {
        match self {
            Self::Proxy(proxy) => proxy.invoke(method, args),
            other => Err(InvocationError::InvalidReceiver {
                member: method.to_string(),
                found: other.kind_name(),
            }),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::List(a), Self::List(b)) | (Self::Set(a), Self::Set(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Proxy(a), Self::Proxy(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

macro_rules! value_conversions {
    ($($ty:ty => $variant:ident, $expected:literal;)*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ReflectError> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(ReflectError::ValueMismatch {
                            expected: $expected,
                            found: other.kind_name(),
                        }),
                    }
                }
            }
        )*
    };
}

/// Extract a native value from a [`Value`]
pub trait FromValue: Sized {
    /// Convert, failing on a shape mismatch
    ///
    /// # Errors
    /// Returns [`ReflectError::ValueMismatch`] if the value has another shape
    fn from_value(value: Value) -> Result<Self, ReflectError>;
}

value_conversions! {
    bool => Bool, "boolean";
    i8 => Byte, "byte";
    i16 => Short, "short";
    i32 => Int, "int";
    i64 => Long, "long";
    f32 => Float, "float";
    f64 => Double, "double";
    char => Char, "char";
    String => Str, "string";
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<EnumConstant> for Value {
    fn from(v: EnumConstant) -> Self {
        Self::Enum(v)
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ReflectError> {
        Ok(value)
    }
}

fn is_builtin_reference(name: &str) -> bool {
    matches!(name, "String" | "Number" | "List" | "Set" | "Map" | "Collection")
}

/// Constant of an enum type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumConstant {
    /// Declaring enum
    pub type_name: String,
    /// Constant name
    pub name: String,
    /// Declaration index
    pub ordinal: usize,
}

impl fmt::Display for EnumConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.name)
    }
}

/// Array value
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    /// Element type name
    pub element: String,
    /// Elements in index order
    pub items: Vec<Value>,
}

impl ArrayValue {
    /// Number of elements
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Object instance storage
#[derive(Debug)]
struct Instance {
    type_name: String,
    fields: RwLock<IndexMap<String, Value>>,
}

/// Shared handle to an object instance
#[derive(Clone)]
pub struct ObjectRef(Arc<Instance>);

impl ObjectRef {
    /// Allocate an instance with no fields set
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self(Arc::new(Instance {
            type_name: type_name.into(),
            fields: RwLock::new(IndexMap::new()),
        }))
    }

    /// Runtime type name
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.0.type_name
    }

    /// Read a field
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.fields.read().get(name).cloned()
    }

    /// Write a field
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.0.fields.write().insert(name.into(), value);
    }

    /// Snapshot of all fields in assignment order
    #[must_use]
    pub fn fields(&self) -> Vec<(String, Value)> {
        self.0
            .fields
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Identity comparison
    #[inline]
    #[must_use]
    pub fn same_instance(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.same_instance(other)
            || (self.type_name() == other.type_name() && self.fields() == other.fields())
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.type_name());
        for (name, value) in self.fields() {
            s.field(&name, &value);
        }
        s.finish()
    }
}

/// Method interception for synthesized interface instances
pub trait ProxyObject: Send + Sync + fmt::Debug {
    /// Interface implemented by this proxy
    fn interface(&self) -> &Type;

    /// Invoke an interface method by name
    ///
    /// # Errors
    /// Returns error if the method does not exist or its value cannot be produced
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, InvocationError>;
}

/// Shared proxy handle
pub type ProxyRef = Arc<dyn ProxyObject>;
