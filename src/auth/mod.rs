//! OAuth credential management.
//!
//! Owns the single access/refresh token pair for the relayed account and its
//! renewal. The pair lives only in memory; losing the process means logging
//! in again through `/api/login`.

mod credentials;
mod error;
mod manager;

pub use credentials::Credential;
pub use error::{AuthError, AuthResult};
pub use manager::CredentialManager;
