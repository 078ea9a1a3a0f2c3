//! Blueprint Core - strategy-driven object graph synthesis
//!
//! Builds fully populated values of arbitrary registered types for tests:
//! - Classifies each type (enum, array, interface, bean, immutable, ...)
//! - Selects value factories from an immutable strategy registry where the
//!   last registration wins
//! - Detects construction cycles and lets cycle handlers break them
//! - Synthesizes interface instances with plain, cached or refreshing dispatch
//!
//! # Example
//!
//! ```rust
//! use blueprint_core::{Blueprint, Configuration};
//! use blueprint_reflect::{TypeDescriptor, TypeRef, TypeRegistry, Value};
//!
//! let types = TypeRegistry::builder()
//!     .register(
//!         TypeDescriptor::class("Person")
//!             .default_constructor()
//!             .property("name", TypeRef::string())
//!             .property("age", TypeRef::int()),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let blueprint = Blueprint::new(types);
//! let config = Configuration::deterministic().with_name("name", "Ada").unwrap();
//! let person = blueprint.construct_with("Person", &config).unwrap();
//!
//! assert_eq!(person.field("name"), Some(Value::from("Ada")));
//! assert_eq!(person.field("age"), Some(Value::Int(0)));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod blueprint;
pub mod checks;
pub mod config;
pub mod creation;
pub mod cycle;
pub mod engine;
pub mod error;
pub mod matching;
pub mod proxy;
pub mod random;
pub mod session;
pub mod settings;

// Re-exports
pub use blueprint::Blueprint;
pub use config::{Configuration, ProxyPolicy};
pub use creation::{
    ArrayCreator, ConstantCreator, CreationStrategy, CyclingCreator, EmptyContainerCreator,
    EnumCreator, EnumSelection, FnCreator, IncrementingCreator, NullCreator,
    RandomPrimitiveCreator, RandomStringCreator, RecursiveCreator, DEFAULT_ARRAY_LENGTH,
    DEFAULT_MAX_STRING_LENGTH,
};
pub use cycle::{ConstantOnCycle, CycleHandlingStrategy, FailOnCycle, NullOnCycle};
pub use engine::Engine;
pub use error::{BlueprintError, Result};
pub use matching::{
    ArrayMatcher, AssignableMatcher, MatchingStrategy, MutatorMatcher, NameMatcher, TypeMatcher,
};
pub use proxy::{Cached, Dispatch, EngineDispatcher, Refreshing, SynthesizedProxy};
pub use random::RandomSource;
pub use session::{Frame, Session, SessionSnapshot};
pub use settings::{Preset, Settings, SettingsError};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building fixtures
    pub use crate::{
        Blueprint, BlueprintError, Configuration, ConstantCreator, CreationStrategy,
        IncrementingCreator, MatchingStrategy, NameMatcher, ProxyPolicy, Session, TypeMatcher,
    };
    pub use blueprint_reflect::{TypeDescriptor, TypeRef, TypeRegistry, Value};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
