use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // operator id
    pub casino_id: i64,
    pub exp: i64,
    pub iat: i64,
}

/// Caller identity, put into request extensions by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenInfo {
    pub operator_id: i64,
    pub casino_id: i64,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Tokens are normally minted by the operator back office; this is used
    /// by tooling and tests.
    pub fn issue_token(
        &self,
        operator_id: i64,
        casino_id: i64,
        expires_in_secs: i64,
    ) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in_secs);

        let claims = Claims {
            sub: operator_id.to_string(),
            casino_id,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn verify_token(&self, token: &str) -> AppResult<TokenInfo> {
        let validation = Validation::new(Algorithm::HS256);
        let claims = decode::<Claims>(token, &self.decoding_key, &validation)?.claims;

        let operator_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::AuthError("Invalid operator id in token".to_string()))?;

        Ok(TokenInfo {
            operator_id,
            casino_id: claims.casino_id,
        })
    }
}
