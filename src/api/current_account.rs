//! Current account service
//!
//! Get the calling account from the request based on the Authorization header

use axum::Extension;
use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use jsonwebtoken::DecodingKey;
use serde::Deserialize;

use crate::api::Error;

/// The key used for decoding JWT tokens
///
/// Tokens are minted elsewhere; this service only verifies them
#[derive(Clone)]
pub struct JwtKeys {
    /// The decoding key
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Create a new decoding key, derived from a secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// The JWT claims that identify an account
#[derive(Debug, Deserialize)]
struct Claims {
    /// The account ID
    sub: i64,

    /// Expiration timestamp (seconds since epoch)
    #[allow(dead_code)] // verified by the decoder
    exp: i64,
}

/// The authenticated calling account
#[derive(Clone, Copy, Debug)]
pub struct CurrentAccount {
    /// The account ID all storage access is scoped by
    pub account_id: i64,
}

impl<S> FromRequestParts<S> for CurrentAccount
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        use jsonwebtoken::Validation;
        use jsonwebtoken::decode;

        // Extract the token from the authorization header
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| Error::forbidden("Missing API token"))?;

        let Extension(jwt_keys) = parts
            .extract::<Extension<JwtKeys>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get JWT keys"))?;

        let validation = Validation::default();

        // Decode the account data
        let token_data = decode::<Claims>(bearer.token(), &jwt_keys.decoding, &validation)
            .map_err(|err| Error::forbidden(format!("Invalid token: {err}")))?;

        Ok(CurrentAccount {
            account_id: token_data.claims.sub,
        })
    }
}
