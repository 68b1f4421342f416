//! Custom extractors for scopegate request data

use axum::extract::FromRequestParts;
use axum::http::{Extensions, request::Parts};

use crate::guard_adapter::resolve_actor;
use crate::prelude::*;
use scopegate_types::actor::ActorContext;

// Actor //
//*******//
/// Authenticated actor, from `ActorContext` or the claims fallback
#[derive(Debug, Clone)]
pub struct Actor(pub ActorContext);

impl<S> FromRequestParts<S> for Actor
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		resolve_actor(&parts.extensions).map(Actor).ok_or(Error::ActorContextMissing)
	}
}

// OptionalActor //
//***************//
/// Optional actor extractor that doesn't fail if the actor is missing
#[derive(Debug, Clone)]
pub struct OptionalActor(pub Option<ActorContext>);

impl<S> FromRequestParts<S> for OptionalActor
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		Ok(OptionalActor(resolve_actor(&parts.extensions)))
	}
}

// RequestExtensions //
//*******************//
/// Snapshot of the request extensions, the transport context for `GuardAdapter`
#[derive(Debug, Clone)]
pub struct RequestExtensions(pub Extensions);

impl<S> FromRequestParts<S> for RequestExtensions
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		Ok(RequestExtensions(parts.extensions.clone()))
	}
}

// RequestId //
//***********//
/// Request ID for tracing and debugging
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Optional Request ID extractor - always succeeds, returns None if not available
#[derive(Clone, Debug)]
pub struct OptionalRequestId(pub Option<String>);

impl<S> FromRequestParts<S> for OptionalRequestId
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let req_id = parts.extensions.get::<RequestId>().map(|r| r.0.clone());
		Ok(OptionalRequestId(req_id))
	}
}


// vim: ts=4
