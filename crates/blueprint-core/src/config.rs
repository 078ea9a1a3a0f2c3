//! Strategy registry
//!
//! A [`Configuration`] is an immutable, append-only sequence of
//! (matcher, creator) pairs plus a parallel sequence of cycle handlers.
//! Registration returns a new configuration sharing structure with the old
//! one, so a configuration can be shared across threads and refined without
//! affecting other holders.
//!
//! Lookups scan the whole sequence and keep the **last** match, so a later
//! registration overrides an earlier one without removing it.
//!
//! # Example
//!
//! ```rust
//! use blueprint_core::{Blueprint, Configuration};
//! use blueprint_reflect::{TypeRegistry, Value};
//!
//! let blueprint = Blueprint::new(TypeRegistry::builtin());
//! let config = Configuration::deterministic().with_type("int", 12).with_type("int", -1);
//!
//! assert_eq!(blueprint.construct_with("int", &config).unwrap(), Value::Int(-1));
//! ```

use crate::creation::{
    ArrayCreator, ConstantCreator, CreationStrategy, EmptyContainerCreator, EnumCreator,
    RandomPrimitiveCreator, RandomStringCreator, RecursiveCreator, DEFAULT_ARRAY_LENGTH,
    DEFAULT_MAX_STRING_LENGTH,
};
use crate::cycle::{CycleHandlingStrategy, NullOnCycle};
use crate::error::Result;
use crate::matching::{
    ArrayMatcher, AssignableMatcher, MatchingStrategy, MutatorMatcher, NameMatcher, TypeMatcher,
};
use crate::random::RandomSource;
use blueprint_reflect::{
    CollectionKind, FieldDescriptor, MethodDescriptor, PrimitiveKind, Type, Value,
};
use im::Vector;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

type CreatorEntry = (Arc<dyn MatchingStrategy>, Arc<dyn CreationStrategy>);
type CycleEntry = (Arc<dyn MatchingStrategy>, Arc<dyn CycleHandlingStrategy>);

/// Dispatch policy for synthesized interface instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyPolicy {
    /// Recompute on every call
    Plain,
    /// Memoize the first value per method
    #[default]
    Cached,
    /// Recompute on every call, stated explicitly
    Refreshing,
}

/// Immutable strategy registry
#[derive(Debug, Clone)]
pub struct Configuration {
    creators: Vector<CreatorEntry>,
    cycle_handlers: Vector<CycleEntry>,
    populate_public_fields: bool,
    proxy_policy: ProxyPolicy,
}

impl Configuration {
    /// Configuration with no strategies
    #[must_use]
    pub fn empty() -> Self {
        Self {
            creators: Vector::new(),
            cycle_handlers: Vector::new(),
            populate_public_fields: false,
            proxy_policy: ProxyPolicy::default(),
        }
    }

    /// Deterministic preset: zero values, empty strings and containers,
    /// first enum constants
    #[must_use]
    pub fn deterministic() -> Self {
        let config = PrimitiveKind::ALL.into_iter().fold(Self::empty(), |config, kind| {
            config.with(
                TypeMatcher::primitive(kind),
                ConstantCreator::new(Value::zero_of(kind)),
            )
        });
        config
            .with(TypeMatcher::new("String"), ConstantCreator::new(""))
            .with(AssignableMatcher::new("Enum"), EnumCreator::first())
            .with_common(DEFAULT_ARRAY_LENGTH)
    }

    /// Random preset drawing from the process-wide generator
    #[must_use]
    pub fn random() -> Self {
        Self::random_from(RandomSource::process(), DEFAULT_MAX_STRING_LENGTH)
    }

    /// Random preset drawing from a generator seeded with `seed`
    #[must_use]
    pub fn random_seeded(seed: u64) -> Self {
        Self::random_from(RandomSource::seeded(seed), DEFAULT_MAX_STRING_LENGTH)
    }

    pub(crate) fn random_from(source: RandomSource, max_string_length: usize) -> Self {
        let config = PrimitiveKind::ALL.into_iter().fold(Self::empty(), |config, kind| {
            config.with(
                TypeMatcher::primitive(kind),
                RandomPrimitiveCreator::with_source(kind, source.clone()),
            )
        });
        let strings = RandomStringCreator::new(max_string_length, source.clone())
            .unwrap_or_else(|_| RandomStringCreator::default());
        config
            .with(TypeMatcher::new("String"), strings)
            .with(AssignableMatcher::new("Enum"), EnumCreator::random(source))
            .with_common(DEFAULT_ARRAY_LENGTH)
    }

    fn with_common(&self, array_length: usize) -> Self {
        CollectionKind::ALL
            .into_iter()
            .fold(self.clone(), |config, kind| {
                config.with(TypeMatcher::new(kind.type_name()), EmptyContainerCreator)
            })
            .with(ArrayMatcher, ArrayCreator::new(array_length))
            .with(MutatorMatcher, RecursiveCreator)
    }

    /// Append a (matcher, creator) pair
    #[must_use]
    pub fn with(
        &self,
        matcher: impl MatchingStrategy + 'static,
        creator: impl CreationStrategy + 'static,
    ) -> Self {
        self.with_shared(Arc::new(matcher), Arc::new(creator))
    }

    /// Append a pair of shared strategies
    ///
    /// Registering the same creator `Arc` in several configurations shares
    /// its state (counters, cursors) between them.
    #[must_use]
    pub fn with_shared(
        &self,
        matcher: Arc<dyn MatchingStrategy>,
        creator: Arc<dyn CreationStrategy>,
    ) -> Self {
        let mut next = self.clone();
        next.creators.push_back((matcher, creator));
        next
    }

    /// Map the type named `type_name` to a constant
    #[must_use]
    pub fn with_type(&self, type_name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(TypeMatcher::new(type_name), ConstantCreator::new(value))
    }

    /// Map members named `name` (or `set<name>`) to a constant
    ///
    /// # Errors
    /// Returns [`crate::BlueprintError::InvalidArgument`] if `name` is blank
    pub fn with_name(&self, name: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        Ok(self.with(NameMatcher::new(name)?, ConstantCreator::new(value)))
    }

    /// Toggle population of public mutable fields
    #[must_use]
    pub fn with_public_fields(&self, enabled: bool) -> Self {
        Self {
            populate_public_fields: enabled,
            ..self.clone()
        }
    }

    /// Set the dispatch policy for interface targets
    #[must_use]
    pub fn with_proxy_policy(&self, policy: ProxyPolicy) -> Self {
        Self {
            proxy_policy: policy,
            ..self.clone()
        }
    }

    /// Build arrays of `length` elements
    #[must_use]
    pub fn with_array_length(&self, length: usize) -> Self {
        self.with(ArrayMatcher, ArrayCreator::new(length))
    }

    /// Append a cycle handler
    #[must_use]
    pub fn with_cycle_handler(
        &self,
        matcher: impl MatchingStrategy + 'static,
        handler: impl CycleHandlingStrategy + 'static,
    ) -> Self {
        let mut next = self.clone();
        next.cycle_handlers
            .push_back((Arc::new(matcher), Arc::new(handler)));
        next
    }

    /// Break cycles through `type_name` with an absent value
    #[must_use]
    pub fn with_null_on_cycle(&self, type_name: impl Into<String>) -> Self {
        self.with_cycle_handler(TypeMatcher::new(type_name), NullOnCycle)
    }

    fn last_creator(&self, accepts: impl Fn(&dyn MatchingStrategy) -> bool) -> Option<&Arc<dyn CreationStrategy>> {
        self.creators
            .iter()
            .rev()
            .find(|(matcher, _)| accepts(matcher.as_ref()))
            .map(|(_, creator)| creator)
    }

    /// Creator registered last for `ty`
    #[must_use]
    pub fn find_creator(&self, ty: &Type) -> Option<&Arc<dyn CreationStrategy>> {
        self.last_creator(|m| m.matches_type(ty))
    }

    /// Creator registered last for member name `name`
    #[must_use]
    pub fn find_creator_for_name(&self, name: &str) -> Option<&Arc<dyn CreationStrategy>> {
        self.last_creator(|m| m.matches_name(name))
    }

    /// Creator registered last for `method`
    #[must_use]
    pub fn find_creator_for_method(
        &self,
        method: &MethodDescriptor,
    ) -> Option<&Arc<dyn CreationStrategy>> {
        self.last_creator(|m| m.matches_method(method))
    }

    /// Creator registered last for `field`
    #[must_use]
    pub fn find_creator_for_field(
        &self,
        field: &FieldDescriptor,
    ) -> Option<&Arc<dyn CreationStrategy>> {
        self.last_creator(|m| m.matches_field(field))
    }

    /// Cycle handler registered last for `ty`
    #[must_use]
    pub fn find_cycle_handler(&self, ty: &Type) -> Option<&Arc<dyn CycleHandlingStrategy>> {
        self.cycle_handlers
            .iter()
            .rev()
            .find(|(matcher, _)| matcher.matches_type(ty))
            .map(|(_, handler)| handler)
    }

    /// Whether public mutable fields are populated
    #[inline]
    #[must_use]
    pub fn populate_public_fields(&self) -> bool {
        self.populate_public_fields
    }

    /// Dispatch policy for interface targets
    #[inline]
    #[must_use]
    pub fn proxy_policy(&self) -> ProxyPolicy {
        self.proxy_policy
    }

    /// Number of registered creators
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.creators.len()
    }

    /// Whether no creators are registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }

    /// Number of registered cycle handlers
    #[inline]
    #[must_use]
    pub fn cycle_handler_count(&self) -> usize {
        self.cycle_handlers.len()
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::deterministic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::FailOnCycle;
    use blueprint_reflect::{TypeRef, TypeRegistry};

    fn ty(name: &str) -> Type {
        TypeRegistry::builtin().resolve(&TypeRef::named(name)).unwrap()
    }

    #[test]
    fn empty_has_no_creators() {
        let config = Configuration::empty();
        assert!(config.is_empty());
        assert!(config.find_creator(&ty("int")).is_none());
    }

    #[test]
    fn with_does_not_touch_receiver() {
        let base = Configuration::deterministic();
        let derived = base.with_type("int", 5);
        assert_eq!(derived.len(), base.len() + 1);
        assert!(!Arc::ptr_eq(
            base.find_creator(&ty("int")).unwrap(),
            derived.find_creator(&ty("int")).unwrap()
        ));
    }

    #[test]
    fn last_registration_wins() {
        let first: Arc<dyn CreationStrategy> = Arc::new(ConstantCreator::new(1_i32));
        let second: Arc<dyn CreationStrategy> = Arc::new(ConstantCreator::new(2_i32));
        let config = Configuration::empty()
            .with_shared(Arc::new(TypeMatcher::new("int")), Arc::clone(&first))
            .with_shared(Arc::new(TypeMatcher::new("Integer")), Arc::clone(&second));
        let found = config.find_creator(&ty("int")).unwrap();
        assert!(Arc::ptr_eq(found, &second));
    }

    #[test]
    fn name_lookup() {
        let config = Configuration::empty().with_name("email", "a@b.c").unwrap();
        assert!(config.find_creator_for_name("setEmail").is_some());
        assert!(config.find_creator_for_name("EMAIL").is_some());
        assert!(config.find_creator_for_name("name").is_none());
        assert!(config.find_creator(&ty("String")).is_none());
    }

    #[test]
    fn blank_name_registration_rejected() {
        let base = Configuration::deterministic();
        let err = base.with_name("", 5).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("name"));
        assert_eq!(base.len(), Configuration::deterministic().len());
    }

    #[test]
    fn flags_copy_on_write() {
        let base = Configuration::deterministic();
        let fields = base.with_public_fields(true);
        let plain = base.with_proxy_policy(ProxyPolicy::Plain);
        assert!(!base.populate_public_fields());
        assert!(fields.populate_public_fields());
        assert_eq!(base.proxy_policy(), ProxyPolicy::Cached);
        assert_eq!(plain.proxy_policy(), ProxyPolicy::Plain);
        assert_eq!(fields.len(), base.len());
    }

    #[test]
    fn cycle_handlers_last_wins() {
        let config = Configuration::empty()
            .with_null_on_cycle("String")
            .with_cycle_handler(TypeMatcher::new("String"), FailOnCycle);
        assert_eq!(config.cycle_handler_count(), 2);
        let handler = config.find_cycle_handler(&ty("String")).unwrap();
        assert!(format!("{handler:?}").contains("FailOnCycle"));
        assert!(config.find_cycle_handler(&ty("int")).is_none());
    }

    #[test]
    fn presets_cover_builtins() {
        for config in [Configuration::deterministic(), Configuration::random_seeded(9)] {
            for kind in PrimitiveKind::ALL {
                assert!(config.find_creator(&ty(kind.primitive_name())).is_some());
                assert!(config.find_creator(&ty(kind.boxed_name())).is_some());
            }
            for kind in CollectionKind::ALL {
                assert!(config.find_creator(&ty(kind.type_name())).is_some());
            }
            assert!(config.find_creator(&ty("String")).is_some());
            assert!(config.find_creator(&ty("Object")).is_none());
        }
    }

    #[test]
    fn proxy_policy_serde_names() {
        #[derive(Deserialize)]
        struct Holder {
            policy: ProxyPolicy,
        }
        let holder: Holder = toml::from_str("policy = \"refreshing\"").unwrap();
        assert_eq!(holder.policy, ProxyPolicy::Refreshing);
    }
}
