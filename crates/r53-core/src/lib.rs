// # r53-core
//
// Core library for the Route 53 resource lifecycle provider.
//
// ## Architecture Overview
//
// This library translates declared Route 53 resources into API calls:
// - **Route53Api**: Trait for single-shot Route 53 API calls
// - **Resource**: Create/read/update/delete/import for one kind of object
// - **waiter**: Polling until changes are INSYNC and objects settle
// - **reconcile**: Record-set diffing for exclusive record management
// - **StateStore**: Trait for persistent resource state
// - **LifecycleEngine**: Plans and applies a stack of declarations
// - **ProviderRegistry**: Plugin-based registry for clients and state stores
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Resource semantics are separate from the SDK
// 2. **Plugin-Based**: Clients and stores are registered dynamically
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Idempotency**: Refresh before acting, persist after every action

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod naming;
pub mod reconcile;
pub mod registry;
pub mod resources;
pub mod state;
pub mod traits;
pub mod waiter;

// Re-export core types for convenience
pub use config::{
    EngineConfig, ProviderConfig, ResourceDeclaration, StackConfig, StateStoreConfig,
    TimeoutsConfig,
};
pub use engine::{ApplySummary, EngineEvent, LifecycleEngine, Plan, PlanAction, PlannedChange};
pub use error::{Error, Result};
pub use registry::ProviderRegistry;
pub use resources::{ProviderContext, ResourceKind};
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{Resource, Route53Api, Route53ApiFactory, StateRecord, StateStore};
pub use waiter::WaitConfig;
