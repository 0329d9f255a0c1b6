//! Identity token verification.

pub mod verifier;

pub use verifier::{bearer_token, AuthConfig, AuthError, Claims, TokenVerifier};
