//! Preference routes

use axum::{
	Router,
	routing::{get, put},
};

use crate::gate::Gate;
use crate::handler;

/// Router exposing the preference API, with `gate` as state.
///
/// Authentication middleware is expected to attach an `ActorContext` (or
/// `AuthClaims`) to the request extensions before these handlers run.
pub fn routes(gate: Gate) -> Router {
	Router::new()
		.route("/preferences", get(handler::list_preferences))
		.route("/preferences/effective", get(handler::get_effective_preferences))
		.route(
			"/preferences/{key}",
			put(handler::put_preference).delete(handler::delete_preference),
		)
		.with_state(gate)
}

// vim: ts=4
