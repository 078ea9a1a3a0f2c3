//! Creation strategies
//!
//! A [`CreationStrategy`] produces a value for an expected type once a
//! matching strategy has selected it. Stateful strategies (counters,
//! cursors) own their state, so two instances never share a sequence unless
//! the same `Arc` is registered twice.

use crate::checks;
use crate::config::Configuration;
use crate::engine::Engine;
use crate::error::{BlueprintError, Result};
use crate::random::RandomSource;
use crate::session::Session;
use blueprint_reflect::{
    CollectionKind, EnumConstant, InvocationError, PrimitiveKind, Type, TypeKind, Value,
};
use parking_lot::Mutex;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Length of arrays built by [`ArrayCreator::default`]
pub const DEFAULT_ARRAY_LENGTH: usize = 7;

/// Upper bound on random string length used by the random preset
pub const DEFAULT_MAX_STRING_LENGTH: usize = 16;

/// Value factory
pub trait CreationStrategy: Send + Sync + fmt::Debug {
    /// Produce a value for `expected`
    ///
    /// Strategies that build nested values recurse through `engine` with the
    /// same `config` and `session`.
    ///
    /// # Errors
    /// Returns error if the strategy cannot produce `expected` or a nested
    /// construction fails
    fn create(
        &self,
        expected: &Type,
        engine: &Engine,
        config: &Configuration,
        session: &mut Session,
    ) -> Result<Value>;
}

fn mismatch(strategy: &dyn fmt::Debug, expected: &Type) -> BlueprintError {
    BlueprintError::construction_failed(
        format!("{strategy:?}"),
        InvocationError::failed(format!("cannot produce a value of type {expected}")),
    )
}

/// Always returns the same value
#[derive(Debug, Clone)]
pub struct ConstantCreator {
    value: Value,
}

impl ConstantCreator {
    /// Create constant strategy
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl CreationStrategy for ConstantCreator {
    fn create(&self, _: &Type, _: &Engine, _: &Configuration, _: &mut Session) -> Result<Value> {
        Ok(self.value.clone())
    }
}

/// Returns the zero value for primitives and absent otherwise
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCreator;

impl CreationStrategy for NullCreator {
    fn create(&self, expected: &Type, _: &Engine, _: &Configuration, _: &mut Session) -> Result<Value> {
        Ok(Value::zero_for(expected))
    }
}

/// Uniformly random value of one primitive kind
#[derive(Debug, Clone)]
pub struct RandomPrimitiveCreator {
    kind: PrimitiveKind,
    source: RandomSource,
}

impl RandomPrimitiveCreator {
    /// Random values of `kind` from the process-wide source
    #[inline]
    #[must_use]
    pub fn new(kind: PrimitiveKind) -> Self {
        Self::with_source(kind, RandomSource::process())
    }

    /// Random values of `kind` from `source`
    #[inline]
    #[must_use]
    pub fn with_source(kind: PrimitiveKind, source: RandomSource) -> Self {
        Self { kind, source }
    }

    /// Primitive kind produced
    #[inline]
    #[must_use]
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    fn sample(&self) -> Value {
        self.source.with_rng(|rng| match self.kind {
            PrimitiveKind::Boolean => Value::Bool(rng.gen()),
            PrimitiveKind::Byte => Value::Byte(rng.gen()),
            PrimitiveKind::Short => Value::Short(rng.gen()),
            PrimitiveKind::Integer => Value::Int(rng.gen()),
            PrimitiveKind::Long => Value::Long(rng.gen()),
            PrimitiveKind::Float => {
                let magnitude = rng.gen::<f32>() * f32::MAX;
                Value::Float(if rng.gen() { magnitude } else { -magnitude })
            }
            PrimitiveKind::Double => {
                let magnitude = rng.gen::<f64>() * f64::MAX;
                Value::Double(if rng.gen() { magnitude } else { -magnitude })
            }
            PrimitiveKind::Character => {
                let code = rng.gen_range(0..=0xD7FF_u32);
                Value::Char(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
            }
        })
    }
}

impl CreationStrategy for RandomPrimitiveCreator {
    fn create(&self, _: &Type, _: &Engine, _: &Configuration, _: &mut Session) -> Result<Value> {
        Ok(self.sample())
    }
}

/// Random alphanumeric string of length `1..=max_length`
#[derive(Debug, Clone)]
pub struct RandomStringCreator {
    max_length: usize,
    source: RandomSource,
}

impl RandomStringCreator {
    /// Create random string strategy
    ///
    /// # Errors
    /// Returns [`BlueprintError::InvalidArgument`] if `max_length` is zero
    pub fn new(max_length: usize, source: RandomSource) -> Result<Self> {
        let max_length = checks::require_positive(max_length, "max_length")?;
        Ok(Self { max_length, source })
    }
}

impl Default for RandomStringCreator {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_STRING_LENGTH,
            source: RandomSource::process(),
        }
    }
}

impl CreationStrategy for RandomStringCreator {
    fn create(&self, _: &Type, _: &Engine, _: &Configuration, _: &mut Session) -> Result<Value> {
        let text = self.source.with_rng(|rng| {
            let len = rng.gen_range(1..=self.max_length);
            rng.sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect::<String>()
        });
        Ok(Value::Str(text))
    }
}

/// Monotonic counter coerced into the expected numeric type
///
/// Each call computes `(current mod max) + offset`, where `max` is the
/// largest value of the expected type, stores it and returns it.
#[derive(Debug)]
pub struct IncrementingCreator {
    current: Mutex<i128>,
    offset: i128,
}

impl IncrementingCreator {
    /// Counter starting at zero with offset one, yielding 1, 2, 3, ...
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Counter whose first result follows `current`
    #[inline]
    #[must_use]
    pub fn starting_at(current: i64) -> Self {
        Self {
            current: Mutex::new(i128::from(current)),
            offset: 1,
        }
    }

    /// Set the step added on each call
    #[inline]
    #[must_use]
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = i128::from(offset);
        self
    }

    fn advance(&self, max: i128) -> i128 {
        let mut current = self.current.lock();
        let next = (*current % max + self.offset) % (max + 1);
        *current = next;
        next
    }
}

impl Default for IncrementingCreator {
    fn default() -> Self {
        Self::new()
    }
}

fn narrow<T: TryFrom<i128>>(value: i128, expected: &Type) -> Result<T> {
    T::try_from(value).map_err(|_| {
        BlueprintError::construction_failed(
            "IncrementingCreator",
            InvocationError::failed(format!("{value} does not fit in {expected}")),
        )
    })
}

impl CreationStrategy for IncrementingCreator {
    #[allow(clippy::cast_precision_loss)]
    fn create(&self, expected: &Type, _: &Engine, _: &Configuration, _: &mut Session) -> Result<Value> {
        let kind = expected
            .kind()
            .primitive_kind()
            .ok_or_else(|| mismatch(self, expected))?;
        let max = kind.max_value().ok_or_else(|| mismatch(self, expected))?;
        let next = self.advance(max);
        Ok(match kind {
            PrimitiveKind::Byte => Value::Byte(narrow(next, expected)?),
            PrimitiveKind::Short => Value::Short(narrow(next, expected)?),
            PrimitiveKind::Integer => Value::Int(narrow(next, expected)?),
            PrimitiveKind::Long => Value::Long(narrow(next, expected)?),
            PrimitiveKind::Float => Value::Float(next as f32),
            PrimitiveKind::Double => Value::Double(next as f64),
            PrimitiveKind::Character => {
                let code: u32 = narrow(next, expected)?;
                Value::Char(char::from_u32(code).ok_or_else(|| mismatch(self, expected))?)
            }
            PrimitiveKind::Boolean => return Err(mismatch(self, expected)),
        })
    }
}

/// Round-robin over a fixed list of values
#[derive(Debug)]
pub struct CyclingCreator {
    values: Vec<Value>,
    cursor: AtomicUsize,
}

impl CyclingCreator {
    /// Cycle through `values` in order
    ///
    /// # Errors
    /// Returns [`BlueprintError::InvalidArgument`] if `values` is empty
    pub fn new<I, V>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        checks::require_non_empty_slice(&values, "values")?;
        Ok(Self {
            values,
            cursor: AtomicUsize::new(0),
        })
    }
}

impl CreationStrategy for CyclingCreator {
    fn create(&self, _: &Type, _: &Engine, _: &Configuration, _: &mut Session) -> Result<Value> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.values.len();
        Ok(self.values[index].clone())
    }
}

/// Fixed-length array filled element by element
///
/// Primitive elements are left at their zero value; other elements are
/// constructed recursively.
#[derive(Debug, Clone, Copy)]
pub struct ArrayCreator {
    length: usize,
}

impl ArrayCreator {
    /// Arrays of `length` elements
    #[inline]
    #[must_use]
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// Configured length
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for ArrayCreator {
    fn default() -> Self {
        Self::new(DEFAULT_ARRAY_LENGTH)
    }
}

impl CreationStrategy for ArrayCreator {
    fn create(
        &self,
        expected: &Type,
        engine: &Engine,
        config: &Configuration,
        session: &mut Session,
    ) -> Result<Value> {
        let element = expected.element().ok_or_else(|| mismatch(self, expected))?;
        let mut items = Vec::with_capacity(self.length);
        for index in 0..self.length {
            if element.is_primitive() {
                items.push(Value::zero_for(element));
            } else {
                session.record_action(format!("constructing element {index} of {expected}"));
                items.push(engine.construct(element, config, session)?);
            }
        }
        Ok(Value::Array(blueprint_reflect::ArrayValue {
            element: element.name().to_string(),
            items,
        }))
    }
}

/// How [`EnumCreator`] picks a constant
#[derive(Debug, Clone)]
pub enum EnumSelection {
    /// First declared constant
    First,
    /// Uniformly chosen constant
    Random(RandomSource),
}

/// Picks an enum constant; absent for enums without constants
#[derive(Debug, Clone)]
pub struct EnumCreator {
    selection: EnumSelection,
}

impl EnumCreator {
    /// Always the first declared constant
    #[inline]
    #[must_use]
    pub fn first() -> Self {
        Self {
            selection: EnumSelection::First,
        }
    }

    /// Uniformly random constant
    #[inline]
    #[must_use]
    pub fn random(source: RandomSource) -> Self {
        Self {
            selection: EnumSelection::Random(source),
        }
    }
}

impl CreationStrategy for EnumCreator {
    fn create(&self, expected: &Type, _: &Engine, _: &Configuration, _: &mut Session) -> Result<Value> {
        if !matches!(expected.kind(), TypeKind::Enum { .. }) {
            return Err(mismatch(self, expected));
        }
        let constants = expected.enum_constants();
        if constants.is_empty() {
            return Ok(Value::Null);
        }
        let ordinal = match &self.selection {
            EnumSelection::First => 0,
            EnumSelection::Random(source) => source.with_rng(|rng| rng.gen_range(0..constants.len())),
        };
        Ok(Value::Enum(EnumConstant {
            type_name: expected.name().to_string(),
            name: constants[ordinal].clone(),
            ordinal,
        }))
    }
}

/// Freshly allocated empty container matching the expected interface
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyContainerCreator;

impl CreationStrategy for EmptyContainerCreator {
    fn create(&self, expected: &Type, _: &Engine, _: &Configuration, _: &mut Session) -> Result<Value> {
        match expected.kind() {
            TypeKind::Collection(CollectionKind::Collection | CollectionKind::List) => {
                Ok(Value::List(Vec::new()))
            }
            TypeKind::Collection(CollectionKind::Set) => Ok(Value::Set(Vec::new())),
            TypeKind::Collection(CollectionKind::Map) => Ok(Value::Map(Vec::new())),
            _ => Err(mismatch(self, expected)),
        }
    }
}

/// Delegates back to the engine for the expected type
///
/// Paired with a mutator matcher, this drives bean and field population.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecursiveCreator;

impl CreationStrategy for RecursiveCreator {
    fn create(
        &self,
        expected: &Type,
        engine: &Engine,
        config: &Configuration,
        session: &mut Session,
    ) -> Result<Value> {
        engine.construct(expected, config, session)
    }
}

/// Closure-backed factory
#[derive(Clone)]
pub struct FnCreator {
    factory: Arc<dyn Fn(&Type) -> Value + Send + Sync>,
}

impl FnCreator {
    /// Wrap a closure
    #[must_use]
    pub fn new(factory: impl Fn(&Type) -> Value + Send + Sync + 'static) -> Self {
        Self {
            factory: Arc::new(factory),
        }
    }
}

impl fmt::Debug for FnCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnCreator")
    }
}

impl CreationStrategy for FnCreator {
    fn create(&self, expected: &Type, _: &Engine, _: &Configuration, _: &mut Session) -> Result<Value> {
        Ok((self.factory)(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_reflect::{TypeDescriptor, TypeRef, TypeRegistry};
    use std::sync::Arc;

    struct Fixture {
        engine: Engine,
        config: Configuration,
        session: Session,
    }

    impl Fixture {
        fn new() -> Self {
            let types = TypeRegistry::builder()
                .register(TypeDescriptor::enumeration("Color", ["RED", "GREEN", "BLUE"]))
                .register(TypeDescriptor::enumeration("Nothing", Vec::<String>::new()))
                .register(TypeDescriptor::class("Tag").default_constructor().property("label", TypeRef::string()))
                .build()
                .unwrap();
            Self {
                engine: Engine::new(Arc::new(types)),
                config: Configuration::deterministic(),
                session: Session::new(),
            }
        }

        fn ty(&self, ty: impl Into<TypeRef>) -> Type {
            self.engine.resolve(&ty.into()).unwrap()
        }

        fn create(&mut self, strategy: &dyn CreationStrategy, ty: impl Into<TypeRef>) -> Result<Value> {
            let ty = self.ty(ty);
            strategy.create(&ty, &self.engine, &self.config, &mut self.session)
        }
    }

    #[test]
    fn constant_and_null() {
        let mut fx = Fixture::new();
        assert_eq!(fx.create(&ConstantCreator::new(5_i32), "int").unwrap(), Value::Int(5));
        assert_eq!(fx.create(&NullCreator, "long").unwrap(), Value::Long(0));
        assert_eq!(fx.create(&NullCreator, "Long").unwrap(), Value::Null);
        assert_eq!(fx.create(&NullCreator, "Tag").unwrap(), Value::Null);
    }

    #[test]
    fn incrementing_counts_up() {
        let mut fx = Fixture::new();
        let counter = IncrementingCreator::new();
        assert_eq!(fx.create(&counter, "int").unwrap(), Value::Int(1));
        assert_eq!(fx.create(&counter, "int").unwrap(), Value::Int(2));
        assert_eq!(fx.create(&counter, "Long").unwrap(), Value::Long(3));
    }

    #[test]
    fn incrementing_wraps_at_type_max() {
        let mut fx = Fixture::new();
        let counter = IncrementingCreator::starting_at(i64::from(i32::MAX));
        assert_eq!(fx.create(&counter, "int").unwrap(), Value::Int(1));

        let bytes = IncrementingCreator::starting_at(126);
        assert_eq!(fx.create(&bytes, "byte").unwrap(), Value::Byte(127));
        assert_eq!(fx.create(&bytes, "byte").unwrap(), Value::Byte(1));

        let longs = IncrementingCreator::starting_at(i64::MAX);
        assert_eq!(fx.create(&longs, "long").unwrap(), Value::Long(1));
    }

    #[test]
    fn incrementing_with_offset() {
        let mut fx = Fixture::new();
        let counter = IncrementingCreator::new().with_offset(10);
        assert_eq!(fx.create(&counter, "short").unwrap(), Value::Short(10));
        assert_eq!(fx.create(&counter, "short").unwrap(), Value::Short(20));
    }

    #[test]
    fn incrementing_rejects_non_numeric() {
        let mut fx = Fixture::new();
        let counter = IncrementingCreator::new();
        assert!(matches!(
            fx.create(&counter, "String"),
            Err(BlueprintError::ConstructionFailed { .. })
        ));
        assert!(fx.create(&counter, "boolean").is_err());
    }

    #[test]
    fn instances_do_not_share_state() {
        let mut fx = Fixture::new();
        let a = IncrementingCreator::new();
        let b = IncrementingCreator::new();
        assert_eq!(fx.create(&a, "int").unwrap(), Value::Int(1));
        assert_eq!(fx.create(&b, "int").unwrap(), Value::Int(1));
    }

    #[test]
    fn cycling_round_robin() {
        let mut fx = Fixture::new();
        let cycle = CyclingCreator::new(["a", "b"]).unwrap();
        let seen: Vec<Value> = (0..5).map(|_| fx.create(&cycle, "String").unwrap()).collect();
        assert_eq!(
            seen,
            ["a", "b", "a", "b", "a"].map(Value::from).to_vec()
        );
        assert!(CyclingCreator::new(Vec::<Value>::new()).is_err());
    }

    #[test]
    fn array_of_primitives_is_zeroed() {
        let mut fx = Fixture::new();
        let value = fx.create(&ArrayCreator::default(), TypeRef::array_of("int")).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), DEFAULT_ARRAY_LENGTH);
        assert!(array.items.iter().all(|v| *v == Value::Int(0)));
    }

    #[test]
    fn array_of_objects_recurses() {
        let mut fx = Fixture::new();
        let value = fx.create(&ArrayCreator::new(3), TypeRef::array_of("Tag")).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.element, "Tag");
        assert_eq!(array.len(), 3);
        for item in &array.items {
            assert_eq!(item.field("label"), Some(Value::from("")));
        }
    }

    #[test]
    fn array_creator_rejects_non_arrays() {
        let mut fx = Fixture::new();
        assert!(fx.create(&ArrayCreator::default(), "int").is_err());
    }

    #[test]
    fn enum_first_and_empty() {
        let mut fx = Fixture::new();
        let value = fx.create(&EnumCreator::first(), "Color").unwrap();
        assert_eq!(value.as_enum().unwrap().name, "RED");
        assert_eq!(value.as_enum().unwrap().ordinal, 0);
        assert_eq!(fx.create(&EnumCreator::first(), "Nothing").unwrap(), Value::Null);
    }

    #[test]
    fn enum_random_stays_in_range() {
        let mut fx = Fixture::new();
        let creator = EnumCreator::random(RandomSource::seeded(7));
        for _ in 0..20 {
            let value = fx.create(&creator, "Color").unwrap();
            assert!(value.as_enum().unwrap().ordinal < 3);
        }
    }

    #[test]
    fn empty_containers() {
        let mut fx = Fixture::new();
        assert_eq!(fx.create(&EmptyContainerCreator, "List").unwrap(), Value::List(vec![]));
        assert_eq!(fx.create(&EmptyContainerCreator, "Set").unwrap(), Value::Set(vec![]));
        assert_eq!(fx.create(&EmptyContainerCreator, "Map").unwrap(), Value::Map(vec![]));
        assert!(fx.create(&EmptyContainerCreator, "String").is_err());
    }

    #[test]
    fn random_strings_are_bounded() {
        let mut fx = Fixture::new();
        let creator = RandomStringCreator::new(5, RandomSource::seeded(1)).unwrap();
        for _ in 0..20 {
            let value = fx.create(&creator, "String").unwrap();
            let len = value.as_str().unwrap().len();
            assert!((1..=5).contains(&len));
        }
        assert!(RandomStringCreator::new(0, RandomSource::process()).is_err());
    }

    #[test]
    fn random_primitives_have_kind() {
        let mut fx = Fixture::new();
        for kind in PrimitiveKind::ALL {
            let creator = RandomPrimitiveCreator::with_source(kind, RandomSource::seeded(3));
            let value = fx.create(&creator, kind.primitive_name()).unwrap();
            assert_eq!(value.kind_name(), kind.primitive_name());
        }
    }

    #[test]
    fn fn_creator_sees_expected_type() {
        let mut fx = Fixture::new();
        let creator = FnCreator::new(|ty| Value::Str(ty.name().to_uppercase()));
        assert_eq!(fx.create(&creator, "Tag").unwrap(), Value::from("TAG"));
    }
}
