pub mod access_requests;
pub mod analytics;
pub mod auth;
pub mod dashboard;
pub mod files;
pub mod profile;
pub mod settings;
