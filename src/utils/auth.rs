use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::{body::Body, extract::Request, http, http::Response, middleware::Next};
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{self, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::core::error::{ConfigError, Error};
use crate::core::state::AppState;
use crate::types::user::AuthorizedUser;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct Claims {
    pub(crate) exp: usize,
    pub(crate) iat: usize,
    pub(crate) sub: String,
}

impl Claims {
    pub(crate) fn new(user_id: i32, ttl: Duration) -> Result<Self, Error> {
        let iat = Utc::now().timestamp() as usize;
        let exp =
            expiry(iat, ttl).ok_or_else(|| Error::Signing("token lifetime overflows".into()))?;

        Ok(Self {
            exp,
            iat,
            sub: user_id.to_string(),
        })
    }

    pub(crate) fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

fn expiry(iat: usize, ttl: Duration) -> Option<usize> {
    usize::try_from(ttl.as_secs())
        .ok()
        .and_then(|ttl| iat.checked_add(ttl))
}

/// Signs `claims` into a compact HS256 token.
pub(crate) fn issue(claims: &Claims, secret: &str) -> Result<String, Error> {
    if secret.is_empty() {
        return Err(Error::Signing("empty signing secret".into()));
    }

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Signing(e.to_string()))
}

/// Checks the signature first, then expiry. A token is expired from the
/// second its `exp` is reached.
pub(crate) fn verify(token: &str, secret: &str) -> Result<Claims, Error> {
    if secret.is_empty() {
        return Err(Error::Signing("empty signing secret".into()));
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let claims = match jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(token_data) => token_data.claims,
        Err(e) => match e.kind() {
            ErrorKind::InvalidSignature => return Err(Error::InvalidSignature),
            _ => return Err(Error::MalformedToken(e)),
        },
    };

    if Utc::now().timestamp() as usize >= claims.exp {
        return Err(Error::ExpiredClaim);
    }

    Ok(claims)
}

/// Process-wide signing secret and token lifetime, fixed at startup.
#[derive(Clone)]
pub(crate) struct TokenService {
    secret: Arc<str>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub(crate) fn new(secret: &str, ttl: Duration) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        if expiry(Utc::now().timestamp() as usize, ttl).is_none() {
            return Err(ConfigError::TokenTtl);
        }

        Ok(Self {
            secret: secret.into(),
            ttl,
        })
    }

    pub(crate) fn issue_for(&self, user_id: i32) -> Result<String, Error> {
        issue(&Claims::new(user_id, self.ttl)?, &self.secret)
    }

    pub(crate) fn verify(&self, token: &str) -> Result<Claims, Error> {
        verify(token, &self.secret)
    }
}

pub(crate) async fn authorize(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response<Body>, Error> {
    let header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or(Error::MissingToken)?;

    let header = header.to_str().map_err(|_| Error::Unauthorized)?.trim();
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();

    if token.is_empty() {
        return Err(Error::Unauthorized);
    }

    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::debug!("rejected token: {:?}", e);
        Error::Unauthorized
    })?;

    let id = claims.user_id().ok_or(Error::Unauthorized)?;

    request.extensions_mut().insert(AuthorizedUser { id });

    Ok(next.run(request).await)
}
