//! Construction engine
//!
//! [`Engine::construct`] classifies a type and builds a value for it. The
//! classification order is fixed and the first applicable step wins:
//!
//! 1. a creation strategy registered for the type
//! 2. enums (first declared constant)
//! 3. arrays (default length, elements built recursively)
//! 4. interfaces (synthesized proxy)
//! 5. abstract or strategy-less built-in types: [`BlueprintError::UnsupportedType`]
//! 6. concrete types with a public no-argument constructor (bean)
//! 7. concrete types with some public constructor (immutable)
//! 8. concrete types without public constructors:
//!    [`BlueprintError::NoAccessibleConstructor`]
//!
//! Steps 2 to 7 run inside a session frame, so the type is on the active
//! stack while its members are built and is popped on every exit path.

use crate::config::Configuration;
use crate::creation::{ArrayCreator, CreationStrategy, EnumCreator};
use crate::error::{BlueprintError, Result};
use crate::proxy;
use crate::session::Session;
use blueprint_reflect::{
    ConstructorDescriptor, Type, TypeKind, TypeRef, TypeRegistry, Value,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Recursive value builder over a type registry
#[derive(Clone)]
pub struct Engine {
    types: Arc<TypeRegistry>,
}

impl Engine {
    /// Create engine over `types`
    #[inline]
    #[must_use]
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        Self { types }
    }

    /// Registry used to resolve member types
    #[inline]
    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Resolve a type reference
    ///
    /// # Errors
    /// Returns [`BlueprintError::InvalidArgument`] for unknown names
    pub fn resolve(&self, type_ref: &TypeRef) -> Result<Type> {
        Ok(self.types.resolve(type_ref)?)
    }

    /// Build a value for `ty`
    ///
    /// # Errors
    /// Returns one of the [`BlueprintError`] kinds; the session stack is
    /// unchanged afterwards either way
    pub fn construct(
        &self,
        ty: &Type,
        config: &Configuration,
        session: &mut Session,
    ) -> Result<Value> {
        if let Some(creator) = config.find_creator(ty) {
            debug!(ty = %ty, ?creator, "registered creator");
            let value = creator.create(ty, self, config, session)?;
            session.record_constructed(ty);
            return Ok(value);
        }

        if session.is_active(ty) {
            if let Some(handler) = config.find_cycle_handler(ty) {
                warn!(ty = %ty, action = session.last_action(), ?handler, "cycle broken by handler");
                return handler.on_cycle(ty, session);
            }
        }

        let mut frame = session.push(ty)?;
        let value = self.classify(ty, config, &mut frame)?;
        frame.record_constructed(ty);
        Ok(value)
    }

    fn classify(&self, ty: &Type, config: &Configuration, session: &mut Session) -> Result<Value> {
        trace!(ty = %ty, kind = ty.kind().label(), "classify");
        match ty.kind() {
            TypeKind::Enum { .. } => {
                debug!(ty = %ty, "enum");
                EnumCreator::first().create(ty, self, config, session)
            }
            TypeKind::Array(_) => {
                debug!(ty = %ty, "array");
                ArrayCreator::default().create(ty, self, config, session)
            }
            TypeKind::Interface => {
                debug!(ty = %ty, policy = ?config.proxy_policy(), "proxy");
                Ok(proxy::synthesize(self, ty, config, session))
            }
            TypeKind::Concrete => self.instantiate(ty, config, session),
            TypeKind::Abstract
            | TypeKind::Primitive(_)
            | TypeKind::Boxed(_)
            | TypeKind::String
            | TypeKind::Collection(_) => Err(BlueprintError::unsupported(ty.name())),
        }
    }

    fn select_constructor(ty: &Type) -> Option<&ConstructorDescriptor> {
        let public = || ty.constructors().iter().filter(|c| c.is_public());
        public()
            .find(|c| c.params().is_empty())
            .or_else(|| public().next())
    }

    fn instantiate(&self, ty: &Type, config: &Configuration, session: &mut Session) -> Result<Value> {
        let ctor = Self::select_constructor(ty).ok_or_else(|| {
            BlueprintError::NoAccessibleConstructor {
                type_name: ty.name().to_string(),
            }
        })?;
        debug!(ty = %ty, ctor = %ctor, bean = ctor.params().is_empty(), "instantiate");

        let mut args = Vec::with_capacity(ctor.params().len());
        for (index, param) in ctor.params().iter().enumerate() {
            session.record_action(format!(
                "constructing parameter {index} ({}) of {ctor}",
                param.ty
            ));
            let param_ty = self.resolve(&param.ty)?;
            args.push(self.construct(&param_ty, config, session)?);
        }

        let instance = ctor
            .invoke(&args)
            .map_err(|err| BlueprintError::construction_failed(ctor, err))?;
        self.populate(ty, &instance, config, session)?;
        Ok(instance)
    }

    fn populate(
        &self,
        ty: &Type,
        instance: &Value,
        config: &Configuration,
        session: &mut Session,
    ) -> Result<()> {
        for method in ty.methods() {
            if !method.is_public() || method.is_static() || method.params().len() != 1 {
                continue;
            }
            let Some(creator) = config.find_creator_for_method(method) else {
                continue;
            };
            session.record_action(format!("populating {method}"));
            let arg_ty = self.resolve(&method.params()[0])?;
            let arg = creator.create(&arg_ty, self, config, session)?;
            method
                .invoke(instance, &[arg])
                .map_err(|err| BlueprintError::construction_failed(method, err))?;
        }

        if !config.populate_public_fields() {
            return Ok(());
        }
        for field in ty.fields() {
            if !field.is_public() || field.is_static() || field.is_final() {
                continue;
            }
            let Some(creator) = config.find_creator_for_field(field) else {
                continue;
            };
            session.record_action(format!("populating field {field}"));
            let field_ty = self.resolve(field.ty())?;
            let value = creator.create(&field_ty, self, config, session)?;
            field
                .set(instance, value)
                .map_err(|err| BlueprintError::construction_failed(field, err))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("types", &self.types.len())
            .finish()
    }
}
