//! Preference subsystem: layered resolver, commands/queries and an in-memory store

pub mod memory;
pub mod resolver;
pub mod service;

pub use memory::MemoryPreferenceRepository;
pub use resolver::{
	PreferenceMap, PreferenceSnapshot, PreferenceTrace, PreferenceTraceLayer, ResolveInput,
	Resolver,
};
pub use service::{
	DeletePreference, ListPreferences, PreferenceActions, PreferenceService, SetPreference,
};

// vim: ts=4
