//! Error type shared by every scopegate crate.
//!
//! The gate-specific variants carry a stable machine code (see [`Error::code`])
//! so transports can tell a policy denial apart from an internal failure.

use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};

pub type SgResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	PermissionDenied,
	DbError,
	ValidationError(String),
	ConfigError(String),
	Internal(String),

	/// Returned by an `AuthorizationPolicy` that rejects the scope
	UnauthorizedScope,

	// Transport guard adapter
	/// No actor could be resolved from the request context or its claims
	ActorContextMissing,
	/// No transport context was handed to the adapter at all
	ContextMissing,
	/// Adapter built without a policy map and without a fallback action
	ScopePolicyMissing(String),
	/// Scope resolution or authorization failed for a reason other than a denial
	ScopeEnforcementFailed(Box<Error>),
	/// The policy explicitly rejected the resolved scope
	ScopeDenied(Box<Error>),

	// externals
	Io(std::io::Error),
}

impl Error {
	/// Stable machine-readable code
	pub fn code(&self) -> &'static str {
		match self {
			Error::NotFound => "NOT_FOUND",
			Error::PermissionDenied => "PERMISSION_DENIED",
			Error::DbError => "DB",
			Error::ValidationError(_) => "VALIDATION",
			Error::ConfigError(_) => "CONFIG",
			Error::Internal(_) => "INTERNAL",
			Error::UnauthorizedScope => "UNAUTHORIZED_SCOPE",
			Error::ActorContextMissing => "ACTOR_CONTEXT_MISSING",
			Error::ContextMissing => "CONTEXT_MISSING",
			Error::ScopePolicyMissing(_) => "SCOPE_POLICY_MISSING",
			Error::ScopeEnforcementFailed(_) => "SCOPE_ENFORCEMENT_FAILED",
			Error::ScopeDenied(_) => "SCOPE_DENIED",
			Error::Io(_) => "IO",
		}
	}

	/// True for every flavour of "the caller is not allowed to do this"
	pub fn is_denial(&self) -> bool {
		matches!(self, Error::UnauthorizedScope | Error::ScopeDenied(_) | Error::PermissionDenied)
	}

	pub fn status_code(&self) -> StatusCode {
		match self {
			Error::UnauthorizedScope | Error::ScopeDenied(_) | Error::PermissionDenied => {
				StatusCode::FORBIDDEN
			}
			Error::ActorContextMissing | Error::ContextMissing => StatusCode::UNAUTHORIZED,
			Error::NotFound => StatusCode::NOT_FOUND,
			Error::ValidationError(_) => StatusCode::BAD_REQUEST,
			Error::DbError
			| Error::ConfigError(_)
			| Error::Internal(_)
			| Error::ScopePolicyMissing(_)
			| Error::ScopeEnforcementFailed(_)
			| Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::DbError => write!(f, "database error"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::UnauthorizedScope => write!(f, "unauthorized scope"),
			Error::ActorContextMissing => write!(f, "actor context missing"),
			Error::ContextMissing => write!(f, "request context missing"),
			Error::ScopePolicyMissing(msg) => write!(f, "scope policy missing: {}", msg),
			Error::ScopeEnforcementFailed(err) => write!(f, "scope enforcement failed: {}", err),
			Error::ScopeDenied(err) => write!(f, "scope denied: {}", err),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::ScopeEnforcementFailed(err) | Error::ScopeDenied(err) => Some(err.as_ref()),
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::ValidationError(err.to_string())
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status_code();
		// Internal details stay in the logs
		let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
			tracing::error!(code = self.code(), error = %self, "request failed");
			"Internal error".to_string()
		} else {
			self.to_string()
		};
		let body = serde_json::json!({
			"error": {
				"code": self.code(),
				"message": message,
			}
		});
		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_denials_map_to_forbidden() {
		let err = Error::ScopeDenied(Box::new(Error::UnauthorizedScope));
		assert!(err.is_denial());
		assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
		assert_eq!(err.code(), "SCOPE_DENIED");
	}

	#[test]
	fn test_enforcement_failure_is_internal() {
		let err = Error::ScopeEnforcementFailed(Box::new(Error::DbError));
		assert!(!err.is_denial());
		assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(err.to_string(), "scope enforcement failed: database error");
	}

	#[test]
	fn test_missing_actor_is_client_error() {
		assert_eq!(Error::ActorContextMissing.status_code(), StatusCode::UNAUTHORIZED);
		assert_eq!(Error::ContextMissing.code(), "CONTEXT_MISSING");
	}

	#[test]
	fn test_source_chain() {
		use std::error::Error as _;
		let err = Error::ScopeDenied(Box::new(Error::UnauthorizedScope));
		let source = err.source().map(ToString::to_string);
		assert_eq!(source.as_deref(), Some("unauthorized scope"));
	}
}

// vim: ts=4
