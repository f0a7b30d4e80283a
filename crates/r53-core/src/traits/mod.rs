//! Core traits for the Route 53 provider
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`Route53Api`]: Single-shot calls to the Route 53 API
//! - [`Resource`]: Lifecycle of one kind of Route 53 object
//! - [`StateStore`]: Persistent resource state

pub mod resource;
pub mod route53_api;
pub mod state_store;

pub use resource::Resource;
pub use route53_api::{Route53Api, Route53ApiFactory};
pub use state_store::{StateRecord, StateStore, StateStoreFactory};
