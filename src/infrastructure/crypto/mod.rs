//! Identity token verification

pub mod jwt;

pub use jwt::{verify_token, JwtConfig, TokenClaims};
