//! Shared types, collaborator traits, and core utilities for scopegate.
//!
//! This crate holds the leaf value types every other crate builds on: the
//! actor/scope model, preference and activity records, and the traits
//! implemented by storage and policy collaborators.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod activity;
pub mod actor;
pub mod error;
pub mod preference_adapter;
pub mod prelude;
pub mod scope;
pub mod types;

// vim: ts=4
