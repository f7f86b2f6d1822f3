use async_trait::async_trait;

use crate::models::User;

/// Out-of-band channel handing one-time codes to users.
///
/// The HTTP handshake never assumes delivery is synchronous or that the code
/// travels in the login response.
#[async_trait]
pub trait OtpDelivery: Send + Sync {
    async fn deliver(&self, user: &User, code: &str) -> Result<(), anyhow::Error>;
}

/// Stand-in channel that records issuance in the log.
///
/// Never logs the code itself; codes are sensitive tokens.
pub struct TracingDelivery;

#[async_trait]
impl OtpDelivery for TracingDelivery {
    async fn deliver(&self, user: &User, _code: &str) -> Result<(), anyhow::Error> {
        tracing::info!(user_id = %user.id, email = %user.email, "One-time code issued");
        Ok(())
    }
}

/// Capturing channel for tests.
#[derive(Default)]
pub struct MockDelivery {
    pub sent: std::sync::Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl OtpDelivery for MockDelivery {
    async fn deliver(&self, user: &User, code: &str) -> Result<(), anyhow::Error> {
        self.sent
            .lock()
            .expect("delivery log poisoned")
            .push((user.id.clone(), code.to_string()));
        Ok(())
    }
}

impl MockDelivery {
    /// Last code delivered for `user_id`, if any.
    pub fn last_code_for(&self, user_id: &str) -> Option<String> {
        self.sent
            .lock()
            .expect("delivery log poisoned")
            .iter()
            .rev()
            .find(|(id, _)| id == user_id)
            .map(|(_, code)| code.clone())
    }

    pub fn delivery_count(&self) -> usize {
        self.sent.lock().expect("delivery log poisoned").len()
    }
}
