//! Cycle handling strategies
//!
//! Consulted when a type that is already on the session stack is requested
//! again. Without a matching handler the engine reports
//! [`BlueprintError::Cycle`](crate::BlueprintError::Cycle).

use crate::error::Result;
use crate::session::Session;
use blueprint_reflect::{Type, Value};
use std::fmt;

/// Recovery for a detected construction cycle
pub trait CycleHandlingStrategy: Send + Sync + fmt::Debug {
    /// Produce a replacement value for the repeated type
    ///
    /// # Errors
    /// Returns error if the handler refuses to break the cycle
    fn on_cycle(&self, ty: &Type, session: &Session) -> Result<Value>;
}

/// Breaks the cycle with an absent value
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOnCycle;

impl CycleHandlingStrategy for NullOnCycle {
    fn on_cycle(&self, ty: &Type, _: &Session) -> Result<Value> {
        Ok(Value::zero_for(ty))
    }
}

/// Breaks the cycle with a fixed value
#[derive(Debug, Clone)]
pub struct ConstantOnCycle {
    value: Value,
}

impl ConstantOnCycle {
    /// Substitute `value` for the repeated type
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl CycleHandlingStrategy for ConstantOnCycle {
    fn on_cycle(&self, _: &Type, _: &Session) -> Result<Value> {
        Ok(self.value.clone())
    }
}

/// Reports the cycle as an error, shadowing earlier handlers
#[derive(Debug, Clone, Copy, Default)]
pub struct FailOnCycle;

impl CycleHandlingStrategy for FailOnCycle {
    fn on_cycle(&self, ty: &Type, session: &Session) -> Result<Value> {
        Err(session.cycle_error(ty))
    }
}
