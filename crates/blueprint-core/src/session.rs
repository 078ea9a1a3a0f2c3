//! Per-construction session state
//!
//! A [`Session`] tracks the stack of types currently being built, which is
//! what detects cycles, plus counters and the last recorded action for
//! diagnostics. [`Session::push`] hands back a [`Frame`] guard that pops on
//! drop, so the stack stays balanced on every exit path.

use crate::error::{BlueprintError, Result};
use blueprint_reflect::Type;
use indexmap::IndexSet;
use smallvec::SmallVec;
use std::ops::{Deref, DerefMut};

/// Mutable state for one top-level construction call tree
#[derive(Debug, Default)]
pub struct Session {
    stack: SmallVec<[Type; 8]>,
    constructed: usize,
    distinct: IndexSet<String>,
    last_action: String,
}

impl Session {
    /// Create empty session
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `ty` onto the active stack
    ///
    /// # Errors
    /// Returns [`BlueprintError::Cycle`] if `ty` is already being constructed
    pub fn push(&mut self, ty: &Type) -> Result<Frame<'_>> {
        if self.is_active(ty) {
            return Err(self.cycle_error(ty));
        }
        tracing::trace!(ty = %ty, depth = self.stack.len(), "push");
        self.stack.push(ty.clone());
        Ok(Frame { session: self })
    }

    fn pop(&mut self) {
        if let Some(ty) = self.stack.pop() {
            tracing::trace!(ty = %ty, depth = self.stack.len(), "pop");
        }
    }

    /// Whether `ty` is on the active stack
    #[inline]
    #[must_use]
    pub fn is_active(&self, ty: &Type) -> bool {
        self.stack.iter().any(|t| t == ty)
    }

    /// Cycle error for `ty` built from the current stack and last action
    #[must_use]
    pub fn cycle_error(&self, ty: &Type) -> BlueprintError {
        let chain = self
            .stack
            .iter()
            .map(|t| t.name().to_string())
            .chain(std::iter::once(ty.name().to_string()))
            .collect();
        BlueprintError::Cycle {
            chain,
            last_action: self.last_action.clone(),
        }
    }

    /// Overwrite the last-action diagnostic
    pub fn record_action(&mut self, description: impl Into<String>) {
        self.last_action = description.into();
        tracing::trace!(action = %self.last_action, "action");
    }

    /// Last recorded action
    #[inline]
    #[must_use]
    pub fn last_action(&self) -> &str {
        &self.last_action
    }

    pub(crate) fn record_constructed(&mut self, ty: &Type) {
        self.constructed += 1;
        if !self.distinct.contains(ty.name()) {
            self.distinct.insert(ty.name().to_string());
        }
    }

    /// Current stack depth
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Active types, outermost first
    pub fn stack(&self) -> impl Iterator<Item = &Type> {
        self.stack.iter()
    }

    /// Total values constructed
    #[inline]
    #[must_use]
    pub fn constructed_count(&self) -> usize {
        self.constructed
    }

    /// Distinct type names constructed, in first-seen order
    pub fn distinct_types(&self) -> impl Iterator<Item = &str> {
        self.distinct.iter().map(String::as_str)
    }

    /// Number of distinct types constructed
    #[inline]
    #[must_use]
    pub fn distinct_type_count(&self) -> usize {
        self.distinct.len()
    }

    /// Point-in-time copy of the diagnostics
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            stack: self.stack.iter().map(|t| t.name().to_string()).collect(),
            constructed: self.constructed,
            distinct_types: self.distinct.iter().cloned().collect(),
            last_action: self.last_action.clone(),
        }
    }

    /// Fresh session carrying over the last action only
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            last_action: self.last_action.clone(),
            ..Self::default()
        }
    }
}

/// Guard for one pushed type; pops on drop
#[derive(Debug)]
pub struct Frame<'s> {
    session: &'s mut Session,
}

impl Deref for Frame<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        self.session
    }
}

impl DerefMut for Frame<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        self.session
    }
}

impl Drop for Frame<'_> {
    fn drop(&mut self) {
        self.session.pop();
    }
}

/// Session diagnostics detached from the live session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Active type names, outermost first
    pub stack: Vec<String>,
    /// Total values constructed
    pub constructed: usize,
    /// Distinct type names constructed
    pub distinct_types: Vec<String>,
    /// Last recorded action
    pub last_action: String,
}
