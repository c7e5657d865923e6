// file: src/auth/mod.rs
// description: bearer token seam for authenticated clair requests
// reference: internal module structure

mod token;

pub use token::{Claims, PskTokenSource};

use crate::error::TokenError;

/// Mints the bearer token attached to every request of one pipeline run.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Result<String, TokenError>;
}
