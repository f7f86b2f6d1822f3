//! Services layer: the credential/OTP handshake, token signing and
//! verification, and the collaborators they depend on.

mod auth;
mod clock;
mod delivery;
pub mod error;
mod session;
mod store;
mod token;

pub use auth::{AuthService, LoginOutcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use delivery::{MockDelivery, OtpDelivery, TracingDelivery};
pub use error::ServiceError;
pub use session::{InMemorySessionStore, OtpSession, OtpSessionStore};
pub use store::{FlatFileStore, StoreDocument, StoreError};
pub use token::{TokenClaims, TokenService, TokenStage};
