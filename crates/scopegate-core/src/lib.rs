//! Multitenant scope enforcement for scopegate.
//!
//! - [`guard`]: scope resolution composed with authorization
//! - [`guard_adapter`]: the transport-facing wrapper (actor extraction, verb mapping, bypass)
//! - [`preference`]: layered preference resolution with per-key provenance
//! - [`activity_access`]: row and field level policy for audit-log reads

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod activity_access;
pub mod config;
pub mod extract;
pub mod guard;
pub mod guard_adapter;
pub mod policy;
pub mod preference;
pub mod prelude;
pub mod roles;

pub use activity_access::{ActivityAccessConfig, ActivityAccessPolicy};
pub use config::GateConfig;
pub use guard::{Guard, NopGuard, ScopeGuard};
pub use guard_adapter::{GuardAdapter, GuardAdapterConfig, GuardInput, GuardResult, ScopeBypass};

// vim: ts=4
