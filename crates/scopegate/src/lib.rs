//! scopegate: multitenant scope enforcement for axum services.
//!
//! # Features
//!
//! - Scope guard composing a scope resolver with an authorization policy
//! - Transport guard adapter: actor extraction, CRUD verb mapping, audited bypass
//! - Layered preferences (system → tenant → org → user) with provenance traces
//! - Row and field level policy for audit-log reads
//!
//! ```no_run
//! # async fn run() -> scopegate::error::SgResult<()> {
//! let config = scopegate::GateConfig::from_file("scopegate.json")?;
//! let gate = scopegate::GateBuilder::new(config).with_logging().build()?;
//! let app: axum::Router = scopegate::routes(gate);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

// Re-export shared types and traits from scopegate-types
pub use scopegate_types::activity;
pub use scopegate_types::actor;
pub use scopegate_types::error;
pub use scopegate_types::preference_adapter;
pub use scopegate_types::scope;
pub use scopegate_types::types;

// Core re-exports
pub use scopegate_core::activity_access;
pub use scopegate_core::config::{self, GateConfig};
pub use scopegate_core::extract;
pub use scopegate_core::guard;
pub use scopegate_core::guard_adapter;
pub use scopegate_core::policy;
pub use scopegate_core::preference;
pub use scopegate_core::roles;

// Local modules
pub mod gate;
pub mod handler;
pub mod prelude;
pub mod routes;

pub use gate::{Gate, GateBuilder, init_logging};
pub use routes::routes;

// vim: ts=4
