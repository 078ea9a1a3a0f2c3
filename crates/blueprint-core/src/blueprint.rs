//! Public entry point
//!
//! [`Blueprint`] bundles a type registry with a default configuration and
//! exposes the three `construct` forms: default configuration with a fresh
//! session, caller configuration with a fresh session, and full control.

use crate::checks;
use crate::config::Configuration;
use crate::engine::Engine;
use crate::error::Result;
use crate::session::Session;
use blueprint_reflect::{FromValue, TypeRef, TypeRegistry, Value};
use std::sync::Arc;

/// Object graph synthesizer
#[derive(Debug, Clone)]
pub struct Blueprint {
    engine: Engine,
    config: Configuration,
}

impl Blueprint {
    /// Synthesizer over `types` using the deterministic preset
    #[must_use]
    pub fn new(types: TypeRegistry) -> Self {
        Self::from_shared(Arc::new(types))
    }

    /// Synthesizer over a shared registry
    #[must_use]
    pub fn from_shared(types: Arc<TypeRegistry>) -> Self {
        Self {
            engine: Engine::new(types),
            config: Configuration::default(),
        }
    }

    /// Replace the default configuration
    #[inline]
    #[must_use]
    pub fn with_configuration(mut self, config: Configuration) -> Self {
        self.config = config;
        self
    }

    /// Registry in use
    #[inline]
    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        self.engine.types()
    }

    /// Default configuration
    #[inline]
    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Underlying engine
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Build `ty` with the default configuration and a fresh session
    ///
    /// # Errors
    /// Returns one of the [`crate::BlueprintError`] kinds
    pub fn construct(&self, ty: impl Into<TypeRef>) -> Result<Value> {
        self.construct_with(ty, &self.config)
    }

    /// Build `ty` with `config` and a fresh session
    ///
    /// # Errors
    /// Returns one of the [`crate::BlueprintError`] kinds
    pub fn construct_with(&self, ty: impl Into<TypeRef>, config: &Configuration) -> Result<Value> {
        let mut session = Session::new();
        self.construct_in(ty, config, &mut session)
    }

    /// Build `ty` with `config` inside a caller-owned session
    ///
    /// # Errors
    /// Returns one of the [`crate::BlueprintError`] kinds
    pub fn construct_in(
        &self,
        ty: impl Into<TypeRef>,
        config: &Configuration,
        session: &mut Session,
    ) -> Result<Value> {
        let type_ref = ty.into();
        checks::require_non_empty(type_ref.base_name(), "type")?;
        let ty = self.engine.resolve(&type_ref)?;
        self.engine.construct(&ty, config, session)
    }

    /// Build a type looked up by name
    ///
    /// # Errors
    /// Returns [`crate::BlueprintError::InvalidArgument`] for blank or unknown names
    pub fn construct_named(&self, name: &str) -> Result<Value> {
        let name = checks::require_non_empty(name, "name")?;
        self.construct(TypeRef::named(name.trim()))
    }

    /// Build `ty` and convert the result
    ///
    /// # Errors
    /// Returns [`crate::BlueprintError::InvalidArgument`] if the value does not
    /// convert to `T`
    pub fn construct_as<T: FromValue>(&self, ty: impl Into<TypeRef>) -> Result<T> {
        let value = self.construct(ty)?;
        Ok(T::from_value(value)?)
    }
}

impl From<TypeRegistry> for Blueprint {
    fn from(types: TypeRegistry) -> Self {
        Self::new(types)
    }
}
