//! Bearer token authentication.
//!
//! Tokens are HS256 JWTs issued elsewhere with the shared secret. The
//! [`auth_hoop`] decodes them on every request but never rejects one; handlers
//! decide whether a principal is required.
use chrono::{TimeDelta, Utc};
use inkpost_domain::{Error as DomainError, Store, User, UserId};
use jsonwebtoken::{EncodingKey, Header};
use salvo::jwt_auth::{ConstDecoder, HeaderFinder};
use salvo::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Claims carried by an access token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Id of the authenticated user.
    pub sub: String,
    /// Username at issuance.
    pub username: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

impl JwtClaims {
    /// Claims for `user` expiring after `ttl`.
    pub fn new(user: &User, ttl: TimeDelta) -> Self {
        Self {
            sub: user.id.to_string(),
            username: user.username.clone(),
            exp: (Utc::now() + ttl).timestamp(),
        }
    }

    /// The user id named by `sub`.
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }
}

/// Middleware decoding `Authorization: Bearer` tokens signed with `secret`.
pub fn auth_hoop(secret: &str) -> JwtAuth<JwtClaims, ConstDecoder> {
    JwtAuth::new(ConstDecoder::from_secret(secret.as_bytes()))
        .finders(vec![Box::new(HeaderFinder::new())])
        .force_passed(true)
}

/// Sign an access token for `user` valid for `ttl`.
pub fn encode_token(secret: &str, user: &User, ttl: TimeDelta) -> Result<String, jsonwebtoken::errors::Error> {
    jsonwebtoken::encode(
        &Header::default(),
        &JwtClaims::new(user, ttl),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// The active user named by a valid token, if any.
pub async fn current_user(depot: &Depot, store: &dyn Store) -> Result<Option<User>, ApiError> {
    if depot.jwt_auth_state() != JwtAuthState::Authorized {
        return Ok(None);
    }
    let Some(id) = depot
        .jwt_auth_data::<JwtClaims>()
        .and_then(|data| data.claims.user_id())
    else {
        return Ok(None);
    };
    Ok(store.user(id).await?.filter(|user| user.is_active))
}

/// Like [`current_user`] but fails with 401 when nobody is authenticated.
pub async fn require_user(depot: &Depot, store: &dyn Store) -> Result<User, ApiError> {
    current_user(depot, store)
        .await?
        .ok_or(ApiError::Domain(DomainError::Unauthorized))
}

#[cfg(test)]
mod tests {
    use inkpost_domain::{MemoryStore, NewUser};
    use salvo::test::{ResponseExt, TestClient};

    use super::*;

    const SECRET: &str = "test-secret";

    #[handler]
    async fn whoami(depot: &mut Depot, res: &mut Response) -> Result<(), ApiError> {
        let store = depot
            .obtain::<std::sync::Arc<MemoryStore>>()
            .map_err(|_| ApiError::internal("no store"))?
            .clone();
        let user = require_user(depot, store.as_ref()).await?;
        res.render(user.username);
        Ok(())
    }

    #[tokio::test]
    async fn test_require_user() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let active = store.create_user(NewUser::new("active", "active@example.com")).await.unwrap();
        let inactive = store
            .create_user(NewUser::new("inactive", "inactive@example.com").active(false))
            .await
            .unwrap();
        let router = Router::new()
            .hoop(affix_state::inject(store.clone()))
            .hoop(auth_hoop(SECRET))
            .get(whoami);
        let service = Service::new(router);

        let token = encode_token(SECRET, &active, TimeDelta::hours(1)).unwrap();
        let mut res = TestClient::get("http://127.0.0.1:8698/").bearer_auth(token).send(&service).await;
        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(res.take_string().await.unwrap(), "active");

        let res = TestClient::get("http://127.0.0.1:8698/").send(&service).await;
        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        let token = encode_token("other-secret", &active, TimeDelta::hours(1)).unwrap();
        let res = TestClient::get("http://127.0.0.1:8698/").bearer_auth(token).send(&service).await;
        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        let token = encode_token(SECRET, &active, TimeDelta::hours(-2)).unwrap();
        let res = TestClient::get("http://127.0.0.1:8698/").bearer_auth(token).send(&service).await;
        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        let token = encode_token(SECRET, &inactive, TimeDelta::hours(1)).unwrap();
        let res = TestClient::get("http://127.0.0.1:8698/").bearer_auth(token).send(&service).await;
        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_claims_user_id() {
        let claims = JwtClaims {
            sub: "42".into(),
            username: "ada".into(),
            exp: 0,
        };
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(JwtClaims { sub: "x".into(), ..claims }.user_id(), None);
    }
}
