mod auth_service_impl;
mod password_hasher;
mod token_issuer;

pub use auth_service_impl::*;
pub use password_hasher::*;
pub use token_issuer::*;
