use crate::application_port::{AuthError, CredentialHasher};
use crate::logger::*;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use secrecy::{ExposeSecret, SecretString};

/// Memory cost in KiB.
pub const HASH_MEMORY_COST: u32 = 19 * 1024;
pub const HASH_TIME_COST: u32 = 2;
pub const HASH_PARALLELISM: u32 = 1;

/// Argon2id hasher producing PHC strings. Hashing runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    pub fn new() -> Result<Self, AuthError> {
        Self::with_cost(HASH_MEMORY_COST, HASH_TIME_COST, HASH_PARALLELISM)
    }

    pub fn with_cost(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, parallelism, None).map_err(|e| {
            error!("invalid argon2 parameters: {}", e);
            AuthError::internal()
        })?;
        Ok(Self { params })
    }

    fn argon2(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }
}

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &SecretString) -> Result<String, AuthError> {
        let params = self.params.clone();
        let password = SecretString::from(password.expose_secret());

        let hashed = tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Self::argon2(params)
                .hash_password(password.expose_secret().as_bytes(), &salt)
                .map(|hash| hash.to_string())
        })
        .await;

        match hashed {
            Ok(Ok(hash)) => Ok(hash),
            Ok(Err(e)) => {
                error!("hash password: {}", e);
                Err(AuthError::internal())
            }
            Err(e) => {
                error!("hash password task: {}", e);
                Err(AuthError::internal())
            }
        }
    }

    async fn verify_password(
        &self,
        password: &SecretString,
        password_hash: &str,
    ) -> Result<bool, AuthError> {
        let params = self.params.clone();
        let password = SecretString::from(password.expose_secret());
        let password_hash = password_hash.to_owned();

        let verified = tokio::task::spawn_blocking(move || -> Result<bool, argon2::password_hash::Error> {
            let parsed = PasswordHash::new(&password_hash)?;
            match Self::argon2(params).verify_password(password.expose_secret().as_bytes(), &parsed)
            {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(e),
            }
        })
        .await;

        match verified {
            Ok(Ok(ok)) => Ok(ok),
            Ok(Err(e)) => {
                error!("verify password: {}", e);
                Err(AuthError::internal())
            }
            Err(e) => {
                error!("verify password task: {}", e);
                Err(AuthError::internal())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2PasswordHasher {
        Argon2PasswordHasher::with_cost(64, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn hash_then_verify() {
        let hasher = cheap();
        let password = SecretString::from("pass123");

        let hash = hasher.hash_password(&password).await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("pass123"));

        assert!(hasher.verify_password(&password, &hash).await.unwrap());
        assert!(
            !hasher
                .verify_password(&SecretString::from("wrong"), &hash)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn hashes_are_salted() {
        let hasher = cheap();
        let password = SecretString::from("pass123");

        let a = hasher.hash_password(&password).await.unwrap();
        let b = hasher.hash_password(&password).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn malformed_hash_is_internal() {
        let hasher = cheap();
        let err = hasher
            .verify_password(&SecretString::from("pass123"), "not-a-phc-string")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::internal());
    }

    #[test]
    fn default_cost_is_accepted() {
        assert!(Argon2PasswordHasher::new().is_ok());
    }

    #[test]
    fn rejects_impossible_cost() {
        assert!(Argon2PasswordHasher::with_cost(0, 0, 0).is_err());
    }
}
