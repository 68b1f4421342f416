//! Gate builder - assembles every scopegate component from a `GateConfig`

use std::sync::Arc;

use crate::prelude::*;
use scopegate_core::activity_access::ActivityAccessPolicy;
use scopegate_core::config::GateConfig;
use scopegate_core::guard::{Guard, ScopeGuard};
use scopegate_core::guard_adapter::{GuardAdapter, GuardAdapterConfig, ScopeExtractor};
use scopegate_core::preference::{
	MemoryPreferenceRepository, PreferenceActions, PreferenceService, Resolver,
};
use scopegate_types::preference_adapter::PreferenceRepository;
use scopegate_types::scope::{AuthorizationPolicy, ScopeResolver};

/// Initialize the global tracing subscriber (`RUST_LOG` style filter).
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
	let res = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_target(false)
		.try_init();
	if res.is_err() {
		debug!("tracing subscriber already installed");
	}
}

/// Assembled components, cheap to clone and shared as axum state
#[derive(Clone)]
pub struct Gate {
	pub guard: Arc<dyn ScopeGuard>,
	pub adapter: Arc<GuardAdapter>,
	pub preferences: Arc<PreferenceService>,
	pub activity: Arc<ActivityAccessPolicy>,
	pub config: Arc<GateConfig>,
}

impl std::fmt::Debug for Gate {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Gate")
			.field("adapter", &self.adapter)
			.field("preferences", &self.preferences)
			.field("activity", &self.activity)
			.finish_non_exhaustive()
	}
}

pub struct GateBuilder {
	config: GateConfig,
	resolver: Option<Arc<dyn ScopeResolver>>,
	policy: Option<Arc<dyn AuthorizationPolicy>>,
	repository: Option<Arc<dyn PreferenceRepository>>,
	scope_extractor: Option<Arc<dyn ScopeExtractor>>,
	logging: bool,
}

impl GateBuilder {
	pub fn new(config: GateConfig) -> Self {
		GateBuilder {
			config,
			resolver: None,
			policy: None,
			repository: None,
			scope_extractor: None,
			logging: false,
		}
	}

	/// Install a tracing subscriber on `build`
	pub fn with_logging(&mut self) -> &mut Self {
		self.logging = true;
		self
	}

	// Collaborators
	pub fn resolver(&mut self, resolver: Arc<dyn ScopeResolver>) -> &mut Self {
		self.resolver = Some(resolver);
		self
	}
	pub fn policy(&mut self, policy: Arc<dyn AuthorizationPolicy>) -> &mut Self {
		self.policy = Some(policy);
		self
	}
	/// Preference storage; defaults to an in-memory repository
	pub fn repository(&mut self, repository: Arc<dyn PreferenceRepository>) -> &mut Self {
		self.repository = Some(repository);
		self
	}
	pub fn scope_extractor(&mut self, extractor: Arc<dyn ScopeExtractor>) -> &mut Self {
		self.scope_extractor = Some(extractor);
		self
	}

	pub fn build(&self) -> SgResult<Gate> {
		if self.logging {
			init_logging();
		}

		let guard = Guard::new(self.resolver.clone(), self.policy.clone());
		if !guard.is_configured() {
			warn!("scope guard has neither resolver nor policy; scopes pass unchecked");
		}
		let guard: Arc<dyn ScopeGuard> = Arc::new(guard);

		let adapter = GuardAdapter::new(
			guard.clone(),
			GuardAdapterConfig {
				policy_map: self.config.policy.policy_map(),
				default_action: self.config.policy.default_action.clone(),
				scope_extractor: self.scope_extractor.clone(),
			},
		)?;

		let repository: Arc<dyn PreferenceRepository> = match &self.repository {
			Some(repository) => repository.clone(),
			None => {
				info!("no preference repository configured, using in-memory storage");
				Arc::new(MemoryPreferenceRepository::new())
			}
		};
		let resolver = Resolver::new(repository.clone())
			.with_defaults(self.config.preferences.defaults.clone());
		let actions = PreferenceActions {
			read: adapter.action_for(CrudOperation::Read)?,
			write: adapter.action_for(CrudOperation::Update)?,
		};
		info!(
			read = %actions.read,
			write = %actions.write,
			defaults = self.config.preferences.defaults.len(),
			"scope gate ready"
		);
		let preferences = PreferenceService::new(guard.clone(), repository, resolver)
			.with_actions(actions)
			.with_restricted_roles(self.config.preferences.restricted_roles.clone());

		let activity = ActivityAccessPolicy::new(self.config.activity.clone());

		Ok(Gate {
			guard,
			adapter: Arc::new(adapter),
			preferences: Arc::new(preferences),
			activity: Arc::new(activity),
			config: Arc::new(self.config.clone()),
		})
	}
}

// vim: ts=4
