// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.
//!
//! Login verifies a bcrypt-hashed secret and issues an HS256 token carrying
//! the user's ID, login code, and role. Every protected request presents
//! that token; [`AuthenticationService::validate_token`] turns it back into
//! an [`AuthenticatedActor`], and [`AuthorizationService::require_role`]
//! gates each operation on the actor's role.

use clinica_domain::{AuditStamp, RecordState};
use clinica_persistence::{SqlitePersistence, UserData, verify_password};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Duration, OffsetDateTime};
use tracing::{debug, error, info, warn};

use crate::error::ApiError;

/// Roles a system user may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including patient edits and soft-deletes.
    Admin,
    /// Front desk: registers patients.
    Recepcionista,
    /// Physicians: browse the patient roster.
    Medico,
    /// Cashiers: record and settle payments.
    Cajero,
}

impl Role {
    /// Returns the wire name of this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Recepcionista => "recepcionista",
            Self::Medico => "medico",
            Self::Cajero => "cajero",
        }
    }
}

impl FromStr for Role {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "recepcionista" => Ok(Self::Recepcionista),
            "medico" => Ok(Self::Medico),
            "cajero" => Ok(Self::Cajero),
            other => Err(ApiError::Unauthorized {
                reason: format!("Unknown role '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roles allowed to register patients.
pub const PATIENT_CREATORS: &[Role] = &[Role::Admin, Role::Recepcionista];
/// Roles allowed to list patients.
pub const PATIENT_BROWSERS: &[Role] = &[Role::Medico, Role::Admin];
/// Any authenticated role: single patient reads, photos, and transactions.
pub const ANY_ROLE: &[Role] = &[Role::Admin, Role::Recepcionista, Role::Medico, Role::Cajero];
/// Roles allowed to edit or soft-delete patients.
pub const PATIENT_EDITORS: &[Role] = &[Role::Admin];

/// An authenticated user, as proven by a valid session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The user's internal identifier.
    pub user_id: i64,
    /// The user's login code, recorded in audit fields.
    pub login_code: String,
    /// The role granted at login.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(user_id: i64, login_code: String, role: Role) -> Self {
        Self {
            user_id,
            login_code,
            role,
        }
    }

    /// Stamps a write performed by this actor now.
    #[must_use]
    pub fn audit_stamp(&self) -> AuditStamp {
        AuditStamp::now(&self.login_code)
    }
}

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The user ID, as a string.
    pub sub: String,
    /// The login code.
    pub login: String,
    /// The granted role.
    pub role: Role,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// A freshly issued session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// The encoded token.
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: OffsetDateTime,
    /// The actor the token proves.
    pub actor: AuthenticatedActor,
}

/// Issues and validates session tokens.
pub struct AuthenticationService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthenticationService {
    /// How long an issued token stays valid.
    pub const TOKEN_LIFETIME: Duration = Duration::hours(1);

    /// Creates a service signing with `secret`.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verifies a login code and secret and issues a token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ValidationError` if either input is empty,
    /// `ApiError::Unauthorized` for an unknown or inactive user or a wrong
    /// secret, and `ApiError::Internal` if the stored hash is unusable.
    pub fn login(
        &self,
        persistence: &mut SqlitePersistence,
        login_code: &str,
        secret: &str,
    ) -> Result<IssuedToken, ApiError> {
        if login_code.trim().is_empty() {
            return Err(ApiError::validation("codigoUsuario", "must not be empty"));
        }
        if secret.is_empty() {
            return Err(ApiError::validation("clave", "must not be empty"));
        }

        let user: UserData = persistence
            .get_user_by_login(login_code)?
            .filter(|u| u.state == RecordState::Active)
            .ok_or_else(|| {
                warn!(login_code, "Login for unknown or inactive user");
                invalid_credentials()
            })?;

        let verified = verify_password(secret, &user.password_hash).map_err(|e| {
            error!(login_code, error = %e, "Stored password hash is unusable");
            ApiError::Internal(String::from("Failed to verify credentials"))
        })?;
        if !verified {
            warn!(login_code, "Login with wrong secret");
            return Err(invalid_credentials());
        }

        let role: Role = user.role.parse()?;
        let actor = AuthenticatedActor::new(user.user_id, user.login_code, role);
        let issued = self.issue_token(actor, OffsetDateTime::now_utc())?;

        info!(
            login_code = %issued.actor.login_code,
            role = %issued.actor.role,
            "User logged in"
        );
        Ok(issued)
    }

    /// Signs a token for `actor` valid from `issued_at` for one hour.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if signing fails.
    pub fn issue_token(
        &self,
        actor: AuthenticatedActor,
        issued_at: OffsetDateTime,
    ) -> Result<IssuedToken, ApiError> {
        let expires_at = issued_at + Self::TOKEN_LIFETIME;
        let claims = Claims {
            sub: actor.user_id.to_string(),
            login: actor.login_code.clone(),
            role: actor.role,
            iat: issued_at.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to sign token: {e}")))?;

        Ok(IssuedToken {
            token,
            expires_at,
            actor,
        })
    }

    /// Validates a token's signature and expiry and returns its actor.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the token is malformed, forged,
    /// expired, or carries an unusable subject.
    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedActor, ApiError> {
        let claims: Claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                ApiError::Unauthorized {
                    reason: String::from("Invalid token"),
                }
            })?
            .claims;

        let user_id: i64 = claims.sub.parse().map_err(|_| ApiError::Unauthorized {
            reason: String::from("Invalid token"),
        })?;

        Ok(AuthenticatedActor::new(user_id, claims.login, claims.role))
    }
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized {
        reason: String::from("Invalid credentials"),
    }
}

/// Role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that `actor` holds one of `allowed`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` naming `action` otherwise.
    pub fn require_role(
        actor: &AuthenticatedActor,
        allowed: &[Role],
        action: &str,
    ) -> Result<(), ApiError> {
        if allowed.contains(&actor.role) {
            return Ok(());
        }
        warn!(
            login_code = %actor.login_code,
            role = %actor.role,
            action,
            "Access denied"
        );
        Err(ApiError::Forbidden {
            action: action.to_string(),
            role: actor.role.to_string(),
        })
    }
}
