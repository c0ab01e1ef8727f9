// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bearer token extraction for protected routes.
//!
//! Every route except health, login and the static photo directory takes a
//! [`SessionActor`], so a request without a valid token never reaches the
//! handler body.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use clinica_api::AuthenticatedActor;
use tracing::{debug, warn};

use crate::{AppState, ErrorResponse};

/// Extractor for the authenticated caller.
///
/// # Errors
///
/// Rejects with HTTP 401 if the `Authorization` header is missing, is not
/// a `Bearer` credential, or carries a token that fails validation
/// (bad signature, malformed, or expired).
pub struct SessionActor(pub AuthenticatedActor);

impl FromRequestParts<AppState> for SessionActor {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| {
                debug!("Missing Authorization header");
                SessionError::MissingAuthorizationHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header encoding");
                SessionError::InvalidAuthorizationHeader
            })?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                warn!("Authorization header is not a Bearer credential");
                SessionError::InvalidAuthorizationHeader
            })?;

        let actor = state.auth.validate_token(token).map_err(|e| {
            warn!(error = %e, "Token validation failed");
            SessionError::InvalidToken
        })?;

        debug!(
            login_code = %actor.login_code,
            role = %actor.role,
            "Token validated"
        );
        Ok(Self(actor))
    }
}

/// Token extraction failures, all answered with 401.
#[derive(Debug)]
pub enum SessionError {
    /// No `Authorization` header.
    MissingAuthorizationHeader,
    /// The header is not `Bearer <token>`.
    InvalidAuthorizationHeader,
    /// The token did not validate.
    InvalidToken,
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message = match self {
            Self::MissingAuthorizationHeader => "Missing Authorization header",
            Self::InvalidAuthorizationHeader => {
                "Invalid Authorization header format. Expected: 'Bearer <token>'"
            }
            Self::InvalidToken => "Invalid token",
        };
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}
