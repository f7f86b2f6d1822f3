//! Domain records persisted in the flat-file store.

mod access_request;
mod file_record;
mod role;
mod user;

pub use access_request::{AccessRequest, RequestStatus, ReviewDecision};
pub use file_record::FileRecord;
pub use role::Role;
pub use user::{SanitizedUser, User};
