use std::sync::Arc;

use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::{
    dtos::auth::{LoginRequest, RegisterRequest},
    models::{Role, User},
    utils::{hash_password, verify_password, Password, PasswordHashString},
};

use super::{
    Clock, OtpDelivery, OtpSession, OtpSessionStore, ServiceError, FlatFileStore, TokenService,
    TokenStage,
};

const OTP_LENGTH: usize = 6;

/// Result of a successful password stage.
pub struct LoginOutcome {
    /// Intermediate token, only good for OTP verification.
    pub token: String,
    pub role: Role,
    /// Echo of the issued code, present only when the dev-mode echo channel
    /// is enabled. Production deployments never see this.
    pub demo_code: Option<String>,
}

/// The credential and OTP handshake.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<FlatFileStore>,
    sessions: Arc<dyn OtpSessionStore>,
    tokens: TokenService,
    delivery: Arc<dyn OtpDelivery>,
    clock: Arc<dyn Clock>,
    otp_session_ttl_minutes: i64,
    expose_demo_code: bool,
}

impl AuthService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<FlatFileStore>,
        sessions: Arc<dyn OtpSessionStore>,
        tokens: TokenService,
        delivery: Arc<dyn OtpDelivery>,
        clock: Arc<dyn Clock>,
        otp_session_ttl_minutes: i64,
        expose_demo_code: bool,
    ) -> Self {
        Self {
            store,
            sessions,
            tokens,
            delivery,
            clock,
            otp_session_ttl_minutes,
            expose_demo_code,
        }
    }

    /// Register a new user. Duplicate detection and the insert happen under
    /// one store write, so two racing registrations cannot both win.
    pub async fn register(&self, req: RegisterRequest) -> Result<(), ServiceError> {
        let password_hash = hash_password(&Password::new(req.password))
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Password hashing error: {}", e)))?;

        let user = User::new(
            req.name,
            req.email,
            req.role,
            req.organization,
            password_hash.into_string(),
        );
        let user_id = user.id.clone();

        self.store
            .update(|doc| {
                let needle = user.email.to_lowercase();
                if doc.users.iter().any(|u| u.email.to_lowercase() == needle) {
                    return Err(ServiceError::DuplicateEmail);
                }
                doc.users.push(user);
                Ok(())
            })
            .await?;

        tracing::info!(user_id = %user_id, "User registered");
        Ok(())
    }

    /// Password stage. On success a pending-OTP session is created and the
    /// code goes out through the delivery channel.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginOutcome, ServiceError> {
        let user = self
            .store
            .find_user_by_email(&req.email)
            .await
            .ok_or(ServiceError::InvalidCredentials)?;

        verify_password(
            &Password::new(req.password),
            &PasswordHashString::new(user.password_hash.clone()),
        )
        .map_err(|_| ServiceError::InvalidCredentials)?;

        let ttl = chrono::Duration::minutes(self.otp_session_ttl_minutes);
        let token = self
            .tokens
            .issue(&user.id, TokenStage::Otp, ttl)
            .map_err(ServiceError::Internal)?;

        let code = generate_otp(OTP_LENGTH);
        let session = OtpSession {
            code_hash: hash_otp(&code),
            user_id: user.id.clone(),
            expires_at: self.clock.now() + ttl,
        };
        self.sessions.insert(token.clone(), session).await;

        self.delivery
            .deliver(&user, &code)
            .await
            .map_err(ServiceError::Internal)?;

        tracing::info!(user_id = %user.id, "Password verified, awaiting OTP");

        Ok(LoginOutcome {
            token,
            role: user.role,
            demo_code: self.expose_demo_code.then_some(code),
        })
    }

    /// OTP stage. A successful verification consumes the session and
    /// upgrades the attempt to an authenticated-stage bearer token.
    pub async fn verify_otp(&self, token: &str, code: &str) -> Result<String, ServiceError> {
        let claims = self
            .tokens
            .verify(token)
            .filter(|c| c.stage == TokenStage::Otp)
            .ok_or(ServiceError::SessionExpired)?;

        let session = self
            .sessions
            .get(token)
            .await
            .ok_or(ServiceError::SessionExpired)?;
        if session.user_id != claims.user_id {
            return Err(ServiceError::SessionExpired);
        }

        let submitted = hash_otp(code);
        if !bool::from(submitted.as_bytes().ct_eq(session.code_hash.as_bytes())) {
            // The session survives a wrong code; only expiry ends retries.
            return Err(ServiceError::InvalidCode);
        }

        // Single use: the next lookup with this token finds nothing.
        self.sessions.remove(token).await;

        let bearer = self
            .tokens
            .issue_access_token(&session.user_id)
            .map_err(ServiceError::Internal)?;

        tracing::info!(user_id = %session.user_id, "OTP verified, session upgraded");
        Ok(bearer)
    }
}

/// Random numeric code.
fn generate_otp(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| rng.gen_range(0..10).to_string())
        .collect()
}

/// Codes are stored hashed, like any other credential.
fn hash_otp(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_otp_is_numeric_and_sized() {
        let code = generate_otp(OTP_LENGTH);
        assert_eq!(code.len(), OTP_LENGTH);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn otp_hash_is_stable_and_hex() {
        let a = hash_otp("123456");
        let b = hash_otp("123456");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, hash_otp("123457"));
    }
}
