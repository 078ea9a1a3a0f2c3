//! Type references and structural classification
//!
//! [`TypeRef`] names a type before resolution, [`TypeKind`] classifies a
//! resolved type for the construction engine.

use crate::descriptor::Type;
use std::fmt;

/// Primitive-like value kinds
///
/// Every kind has an unboxed spelling (`int`) and a boxed spelling
/// (`Integer`); both resolve to the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `boolean` / `Boolean`
    Boolean,
    /// `byte` / `Byte`
    Byte,
    /// `short` / `Short`
    Short,
    /// `int` / `Integer`
    Integer,
    /// `long` / `Long`
    Long,
    /// `float` / `Float`
    Float,
    /// `double` / `Double`
    Double,
    /// `char` / `Character`
    Character,
}

impl PrimitiveKind {
    /// All kinds in declaration order
    pub const ALL: [PrimitiveKind; 8] = [
        Self::Boolean,
        Self::Byte,
        Self::Short,
        Self::Integer,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::Character,
    ];

    /// Unboxed type name
    #[must_use]
    pub const fn primitive_name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Integer => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Character => "char",
        }
    }

    /// Boxed type name
    #[must_use]
    pub const fn boxed_name(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Byte => "Byte",
            Self::Short => "Short",
            Self::Integer => "Integer",
            Self::Long => "Long",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Character => "Character",
        }
    }

    /// Look up a kind by either of its spellings
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.primitive_name() == name || kind.boxed_name() == name)
    }

    /// Whether the boxed form extends `Number`
    #[inline]
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::Boolean | Self::Character)
    }

    /// Largest representable value as an integer
    ///
    /// Floating point kinds are capped at `i64::MAX` so counters stay exact.
    /// `char` stops below the surrogate range.
    #[must_use]
    pub const fn max_value(self) -> Option<i128> {
        match self {
            Self::Boolean => None,
            Self::Byte => Some(i8::MAX as i128),
            Self::Short => Some(i16::MAX as i128),
            Self::Integer => Some(i32::MAX as i128),
            Self::Long | Self::Float | Self::Double => Some(i64::MAX as i128),
            Self::Character => Some(0xD7FF),
        }
    }
}

/// Built-in container interfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// `Collection`
    Collection,
    /// `List`
    List,
    /// `Set`
    Set,
    /// `Map`
    Map,
}

impl CollectionKind {
    /// All container kinds
    pub const ALL: [CollectionKind; 4] = [Self::Collection, Self::List, Self::Set, Self::Map];

    /// Registered type name
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Collection => "Collection",
            Self::List => "List",
            Self::Set => "Set",
            Self::Map => "Map",
        }
    }
}

/// Structural classification of a resolved type
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// Unboxed primitive
    Primitive(PrimitiveKind),
    /// Boxed counterpart of a primitive
    Boxed(PrimitiveKind),
    /// `String`
    String,
    /// Enumeration with its constants in declaration order
    Enum {
        /// Declared constants
        constants: Vec<String>,
    },
    /// Array of the element type
    Array(Type),
    /// Container interface
    Collection(CollectionKind),
    /// Interface, constructed through a proxy
    Interface,
    /// Abstract class
    Abstract,
    /// Concrete class
    Concrete,
}

impl TypeKind {
    /// Primitive kind for both boxed and unboxed forms
    #[inline]
    #[must_use]
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            Self::Primitive(kind) | Self::Boxed(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Short label used in logs
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Primitive(_) => "primitive",
            Self::Boxed(_) => "boxed",
            Self::String => "string",
            Self::Enum { .. } => "enum",
            Self::Array(_) => "array",
            Self::Collection(_) => "collection",
            Self::Interface => "interface",
            Self::Abstract => "abstract",
            Self::Concrete => "concrete",
        }
    }
}

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Accessible to the engine
    #[default]
    Public,
    /// Hidden from the engine
    Private,
}

/// Unresolved reference to a type
///
/// Member signatures use `TypeRef` so mutually recursive types can be
/// declared before either is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// Registered type by name
    Named(String),
    /// Array of the element type
    Array(Box<TypeRef>),
}

impl TypeRef {
    /// Reference a registered type
    #[inline]
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Reference an array of `element`
    #[inline]
    #[must_use]
    pub fn array_of(element: impl Into<TypeRef>) -> Self {
        Self::Array(Box::new(element.into()))
    }

    /// `int`
    #[must_use]
    pub fn int() -> Self {
        Self::named("int")
    }

    /// `long`
    #[must_use]
    pub fn long() -> Self {
        Self::named("long")
    }

    /// `double`
    #[must_use]
    pub fn double() -> Self {
        Self::named("double")
    }

    /// `boolean`
    #[must_use]
    pub fn boolean() -> Self {
        Self::named("boolean")
    }

    /// `String`
    #[must_use]
    pub fn string() -> Self {
        Self::named("String")
    }

    /// Innermost non-array name
    #[must_use]
    pub fn base_name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Array(element) => element.base_name(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Array(element) => write!(f, "{element}[]"),
        }
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<&Type> for TypeRef {
    fn from(ty: &Type) -> Self {
        ty.to_type_ref()
    }
}
