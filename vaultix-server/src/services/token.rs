use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::Clock;

type HmacSha256 = Hmac<Sha256>;

/// Login stage a token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStage {
    /// Issued after the password stage; only good for OTP verification.
    Otp,
    /// Issued after OTP verification; good for all protected routes.
    Auth,
}

/// Self-contained signed claims.
///
/// Wire format: `base64url(JSON claims) + "." + base64url(HMAC-SHA256)`,
/// where the MAC covers the encoded claims component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub user_id: String,
    pub stage: TokenStage,
    /// Issued-at, Unix seconds.
    pub ts: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
}

/// Signs and verifies bearer tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    access_token_expiry_minutes: i64,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(
        secret: impl Into<String>,
        access_token_expiry_minutes: i64,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            secret: secret.into(),
            access_token_expiry_minutes,
            clock,
        }
    }

    /// Issue a token for `user_id` at the given stage, valid for `ttl`.
    pub fn issue(
        &self,
        user_id: &str,
        stage: TokenStage,
        ttl: chrono::Duration,
    ) -> Result<String, anyhow::Error> {
        let now = self.clock.now();
        let claims = TokenClaims {
            user_id: user_id.to_string(),
            stage,
            ts: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        self.sign(&claims)
    }

    /// Issue an authenticated-stage bearer token with the configured expiry.
    pub fn issue_access_token(&self, user_id: &str) -> Result<String, anyhow::Error> {
        self.issue(
            user_id,
            TokenStage::Auth,
            chrono::Duration::minutes(self.access_token_expiry_minutes),
        )
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, anyhow::Error> {
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
        let signature = URL_SAFE_NO_PAD.encode(self.mac(payload.as_bytes())?);
        Ok(format!("{payload}.{signature}"))
    }

    fn mac(&self, bytes: &[u8]) -> Result<Vec<u8>, anyhow::Error> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("Invalid key length: {}", e))?;
        mac.update(bytes);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Verify signature and expiry. Any failure yields `None`: a token that
    /// does not verify is simply unauthenticated, never an error.
    pub fn verify(&self, raw: &str) -> Option<TokenClaims> {
        let (payload, signature) = raw.split_once('.')?;

        let expected = self.mac(payload.as_bytes()).ok()?;
        let provided = URL_SAFE_NO_PAD.decode(signature).ok()?;
        if expected.len() != provided.len() {
            return None;
        }
        if !bool::from(expected.ct_eq(&provided)) {
            return None;
        }

        let claims: TokenClaims =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).ok()?).ok()?;
        if claims.exp <= self.clock.now().timestamp() {
            return None;
        }
        Some(claims)
    }
}
