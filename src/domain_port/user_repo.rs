use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username already taken")]
    UniqueViolation,
    #[error("store error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Queries against the `users` table, bound to a transaction.
#[async_trait::async_trait]
pub trait UserRepo: Send {
    async fn find_by_username(&mut self, username: &str)
    -> Result<Option<UserRecord>, StoreError>;

    /// Fails with [`StoreError::UniqueViolation`] when the username is taken,
    /// including by a concurrent transaction that commits first.
    async fn insert_user(
        &mut self,
        username: &str,
        password_hash: &str,
        signup_method: SignupMethod,
    ) -> Result<UserId, StoreError>;
}
