//! Password hashing, bearer tokens and viewer extraction.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::{SaltString, rand_core::OsRng};
use poem::{FromRequest, Request, RequestBody, http::header};
use poem_openapi::{SecurityScheme, auth::Bearer};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};

use crate::{
    entities::user,
    error::{BlogError, Result},
    state::AppState,
};

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| BlogError::PasswordHash(e.to_string()))
}

/// A stored hash that cannot be parsed never verifies.
pub fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i32,
    pub username: String,
    pub exp: i64,
}

pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn issue(&self, user: &user::Model) -> Result<String> {
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .ok()
    }
}

/// Required bearer authentication. A missing or invalid token, or one whose
/// user no longer exists, is rejected with 401 before the handler runs.
#[derive(SecurityScheme)]
#[oai(ty = "bearer", checker = "bearer_checker")]
pub struct BearerAuth(pub Claims);

async fn bearer_checker(req: &Request, bearer: Bearer) -> Option<Claims> {
    let state = req.data::<AppState>()?;
    live_claims(state, &bearer.token).await
}

/// Claims of a token that verifies and still belongs to an existing user.
async fn live_claims(state: &AppState, token: &str) -> Option<Claims> {
    let claims = state.tokens.verify(token)?;
    match user::Entity::find_by_id(claims.sub).one(&state.db).await {
        Ok(Some(_)) => Some(claims),
        Ok(None) => {
            tracing::info!(user_id = claims.sub, "token of a deleted user");
            None
        }
        Err(err) => {
            tracing::error!(error = %err, "user lookup for token failed");
            None
        }
    }
}

/// Optional authentication for public endpoints. Anonymous when the header
/// is missing, the token does not verify or its user is gone.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<Claims>);

impl Viewer {
    pub fn user_id(&self) -> Option<i32> {
        self.0.as_ref().map(|claims| claims.sub)
    }
}

impl<'a> FromRequest<'a> for Viewer {
    async fn from_request(req: &'a Request, _body: &mut RequestBody) -> poem::Result<Self> {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));
        let claims = match (req.data::<AppState>(), token) {
            (Some(state), Some(token)) => live_claims(state, token.trim()).await,
            _ => None,
        };
        Ok(Self(claims))
    }
}
