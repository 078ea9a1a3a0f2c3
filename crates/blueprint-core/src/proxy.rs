//! Interface synthesis
//!
//! Interfaces are built as [`SynthesizedProxy`] values. Every method call goes
//! through a [`Dispatch`] implementation; [`EngineDispatcher`] computes the
//! value and [`Cached`] / [`Refreshing`] wrap it to choose the memoization
//! policy.
//!
//! A call resolves its value from the creator registered for the method name
//! if there is one, otherwise by constructing the return type. Each call runs
//! in a session forked from the one active when the proxy was built.

use crate::checks;
use crate::config::{Configuration, ProxyPolicy};
use crate::engine::Engine;
use crate::session::Session;
use blueprint_reflect::{InvocationError, MethodDescriptor, ProxyObject, Type, Value};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Produces the result of one proxied call
pub trait Dispatch: Send + Sync + fmt::Debug {
    /// Compute the value returned by `method`
    ///
    /// # Errors
    /// Returns error if the value cannot be constructed
    fn dispatch(&self, method: &MethodDescriptor, args: &[Value]) -> Result<Value, InvocationError>;
}

/// Computes every call through the engine
pub struct EngineDispatcher {
    engine: Engine,
    config: Configuration,
    origin: Session,
}

impl EngineDispatcher {
    /// Dispatcher bound to a configuration and originating session
    #[must_use]
    pub fn new(engine: Engine, config: Configuration, origin: &Session) -> Self {
        Self {
            engine,
            config,
            origin: origin.fork(),
        }
    }
}

impl fmt::Debug for EngineDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineDispatcher")
            .field("origin", &self.origin.last_action())
            .finish_non_exhaustive()
    }
}

impl Dispatch for EngineDispatcher {
    fn dispatch(&self, method: &MethodDescriptor, _args: &[Value]) -> Result<Value, InvocationError> {
        let Some(return_ref) = method.return_type() else {
            return Ok(Value::Null);
        };
        let mut session = self.origin.fork();
        session.record_action(format!("invoking {method}"));

        let return_ty = self
            .engine
            .resolve(return_ref)
            .map_err(InvocationError::dispatch)?;
        let value = match self.config.find_creator_for_name(method.name()) {
            Some(creator) => creator.create(&return_ty, &self.engine, &self.config, &mut session),
            None => self.engine.construct(&return_ty, &self.config, &mut session),
        };
        value.map_err(InvocationError::dispatch)
    }
}

/// Memoizes the first value computed for each method signature
#[derive(Debug)]
pub struct Cached<D> {
    inner: D,
    memo: DashMap<String, Value>,
}

impl<D: Dispatch> Cached<D> {
    /// Wrap `inner`
    #[must_use]
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            memo: DashMap::new(),
        }
    }
}

impl<D: Dispatch> Dispatch for Cached<D> {
    fn dispatch(&self, method: &MethodDescriptor, args: &[Value]) -> Result<Value, InvocationError> {
        let key = method.signature_key();
        if let Some(hit) = self.memo.get(&key) {
            return Ok(hit.value().clone());
        }
        let computed = self.inner.dispatch(method, args)?;
        // A racing caller may have stored first; everyone returns the stored value.
        Ok(self.memo.entry(key).or_insert(computed).value().clone())
    }
}

/// Recomputes on every call
#[derive(Debug)]
pub struct Refreshing<D> {
    inner: D,
}

impl<D: Dispatch> Refreshing<D> {
    /// Wrap `inner`
    #[inline]
    #[must_use]
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

impl<D: Dispatch> Dispatch for Refreshing<D> {
    fn dispatch(&self, method: &MethodDescriptor, args: &[Value]) -> Result<Value, InvocationError> {
        self.inner.dispatch(method, args)
    }
}

/// Synthesized interface instance
#[derive(Debug)]
pub struct SynthesizedProxy {
    interface: Type,
    dispatcher: Box<dyn Dispatch>,
}

impl SynthesizedProxy {
    /// Proxy for `interface` routing calls to `dispatcher`
    #[must_use]
    pub fn new(interface: Type, dispatcher: Box<dyn Dispatch>) -> Self {
        Self {
            interface,
            dispatcher,
        }
    }
}

impl ProxyObject for SynthesizedProxy {
    fn interface(&self) -> &Type {
        &self.interface
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, InvocationError> {
        checks::require_non_empty(method, "method").map_err(InvocationError::dispatch)?;
        let descriptor = self
            .interface
            .method_for(method, args)
            .filter(|m| !m.is_static())
            .ok_or_else(|| InvocationError::NoSuchMethod {
                interface: self.interface.name().to_string(),
                method: method.to_string(),
                arity: args.len(),
            })?;
        tracing::trace!(interface = %self.interface, method, "proxy call");
        self.dispatcher.dispatch(descriptor, args)
    }
}

pub(crate) fn synthesize(
    engine: &Engine,
    interface: &Type,
    config: &Configuration,
    session: &Session,
) -> Value {
    let base = EngineDispatcher::new(engine.clone(), config.clone(), session);
    let dispatcher: Box<dyn Dispatch> = match config.proxy_policy() {
        ProxyPolicy::Plain => Box::new(base),
        ProxyPolicy::Cached => Box::new(Cached::new(base)),
        ProxyPolicy::Refreshing => Box::new(Refreshing::new(base)),
    };
    Value::Proxy(Arc::new(SynthesizedProxy::new(interface.clone(), dispatcher)))
}
