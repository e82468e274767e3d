use crate::domain_model::SignupMethod;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

pub const INVALID_CREDENTIALS: &str = "invalid username or password";
pub const INTERNAL_ERROR: &str = "internal server error";

/// Failure taxonomy shared by the service, the RPC wire and the gateway.
/// Variants are listed in precedence order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    AlreadyExists(String),
    #[error("{0}")]
    Internal(String),
}

impl AuthError {
    pub fn invalid_credentials() -> Self {
        AuthError::Unauthenticated(INVALID_CREDENTIALS.to_string())
    }

    pub fn already_exists() -> Self {
        AuthError::AlreadyExists("user already exists".to_string())
    }

    /// Generic internal failure. The cause belongs in the server log, not here.
    pub fn internal() -> Self {
        AuthError::Internal(INTERNAL_ERROR.to_string())
    }

    pub fn message(&self) -> &str {
        match self {
            AuthError::InvalidArgument(m)
            | AuthError::Unauthenticated(m)
            | AuthError::AlreadyExists(m)
            | AuthError::Internal(m) => m,
        }
    }
}

#[derive(Debug)]
pub struct LoginInput {
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub struct SignupInput {
    pub username: String,
    pub password: SecretString,
    pub method: SignupMethod,
    /// External verification code, only meaningful for `SignupMethod::Google`.
    pub code: SecretString,
}

/// Opaque bearer credential handed out on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub String);

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: SessionToken,
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &SecretString) -> Result<String, AuthError>;
    async fn verify_password(
        &self,
        password: &SecretString,
        password_hash: &str,
    ) -> Result<bool, AuthError>;
}

pub trait TokenIssuer: Send + Sync {
    fn issue(&self, username: &str) -> SessionToken;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError>;
    async fn signup(&self, request: SignupInput) -> Result<(), AuthError>;
}
