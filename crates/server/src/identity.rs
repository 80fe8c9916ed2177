// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor extraction at the server boundary.
//!
//! Authentication happens upstream. The gateway forwards the caller's
//! identity in two headers, which this extractor turns into an
//! [`AuthenticatedActor`].

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use cuebook_api::{AuthenticatedActor, authenticate};
use tracing::{debug, warn};

/// Header carrying the caller's identifier.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// Header carrying the caller's role (`user` or `staff`).
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Extractor for the calling actor.
///
/// # Errors
///
/// Rejects with HTTP 401 if either header is missing, not valid text, or
/// names an unknown role.
pub struct RequestActor(pub AuthenticatedActor);

impl<S: Send + Sync> FromRequestParts<S> for RequestActor {
    type Rejection = IdentityError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor_id: &str = header(parts, ACTOR_ID_HEADER)?;
        let role: &str = header(parts, ACTOR_ROLE_HEADER)?;

        let actor: AuthenticatedActor = authenticate(actor_id, role).map_err(|e| {
            warn!(error = %e, "Actor identity rejected");
            IdentityError::Invalid(e.to_string())
        })?;

        debug!(actor_id = %actor.id, role = actor.role.as_str(), "Actor identified");
        Ok(Self(actor))
    }
}

fn header<'a>(parts: &'a Parts, name: &'static str) -> Result<&'a str, IdentityError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| {
            debug!(header = name, "Missing identity header");
            IdentityError::MissingHeader(name)
        })?
        .to_str()
        .map_err(|_| {
            warn!(header = name, "Invalid identity header encoding");
            IdentityError::Invalid(format!("{name} is not valid text"))
        })
}

/// Identity extraction errors.
#[derive(Debug)]
pub enum IdentityError {
    /// A required header is absent.
    MissingHeader(&'static str),
    /// A header is present but unusable.
    Invalid(String),
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingHeader(name) => format!("Missing {name} header"),
            Self::Invalid(reason) => format!("Authentication failed: {reason}"),
        };
        crate::HttpError {
            status: StatusCode::UNAUTHORIZED,
            message,
        }
        .into_response()
    }
}
