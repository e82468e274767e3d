use crate::application_port::*;
use crate::domain_model::SignupMethod;
use crate::domain_port::{StorageTx, StoreError, TxManager};
use crate::logger::*;
use secrecy::{ExposeSecret, SecretString};
use std::fmt::Display;
use std::sync::Arc;

pub struct RealAuthService {
    tx_manager: Arc<dyn TxManager>,
    credential_hasher: Arc<dyn CredentialHasher>,
    token_issuer: Arc<dyn TokenIssuer>,
    logger: Logger,
}

impl RealAuthService {
    pub fn new(
        tx_manager: Arc<dyn TxManager>,
        credential_hasher: Arc<dyn CredentialHasher>,
        token_issuer: Arc<dyn TokenIssuer>,
        logger: Logger,
    ) -> Self {
        Self {
            tx_manager,
            credential_hasher,
            token_issuer,
            logger,
        }
    }

    fn validate_login(username: &str, password: &SecretString) -> Result<(), AuthError> {
        if username.is_empty() {
            return Err(AuthError::InvalidArgument("username is required".to_string()));
        }
        if password.expose_secret().is_empty() {
            return Err(AuthError::InvalidArgument("password is required".to_string()));
        }
        Ok(())
    }

    fn validate_signup(request: &SignupInput) -> Result<(), AuthError> {
        if request.username.is_empty() {
            return Err(AuthError::InvalidArgument("username is required".to_string()));
        }
        match request.method {
            SignupMethod::Email if request.password.expose_secret().is_empty() => Err(
                AuthError::InvalidArgument("password is required for email signup".to_string()),
            ),
            SignupMethod::Google if request.code.expose_secret().is_empty() => Err(
                AuthError::InvalidArgument("code is required for google signup".to_string()),
            ),
            _ => Ok(()),
        }
    }

    /// Logs the cause and returns the generic internal error.
    fn internal(context: &str, cause: impl Display) -> AuthError {
        error!("{}: {}", context, cause);
        AuthError::internal()
    }

    async fn rollback(tx: Box<dyn StorageTx<'_> + '_>) {
        if let Err(e) = tx.rollback().await {
            warn!("rollback failed: {}", e);
        }
    }

    async fn login_in_scope(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        let LoginInput { username, password } = request;
        Self::validate_login(&username, &password)?;

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| Self::internal("begin transaction", e))?;

        let found = match tx.find_by_username(&username).await {
            Ok(found) => found,
            Err(e) => {
                Self::rollback(tx).await;
                return Err(Self::internal("find user", e));
            }
        };
        tx.commit()
            .await
            .map_err(|e| Self::internal("commit login", e))?;

        let Some(record) = found else {
            debug!(%username, "login for unknown user");
            return Err(AuthError::invalid_credentials());
        };

        // externally authenticated accounts have no password to match
        if record.password_hash.is_empty() {
            debug!(%username, method = %record.signup_method, "password login on passwordless account");
            return Err(AuthError::invalid_credentials());
        }

        let ok = self
            .credential_hasher
            .verify_password(&password, &record.password_hash)
            .await?;
        drop(password);
        if !ok {
            debug!(%username, "password mismatch");
            return Err(AuthError::invalid_credentials());
        }

        let token = self.token_issuer.issue(&username);
        info!(user_id = %record.user_id, "login succeeded");

        Ok(LoginResult { token })
    }

    async fn signup_in_scope(&self, request: SignupInput) -> Result<(), AuthError> {
        Self::validate_signup(&request)?;
        let SignupInput {
            username,
            password,
            method,
            code: _,
        } = request;

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| Self::internal("begin transaction", e))?;

        match self
            .create_user_in_tx(tx.as_mut(), &username, password, method)
            .await
        {
            Ok(()) => {
                tx.commit()
                    .await
                    .map_err(|e| Self::internal("commit signup", e))?;
                info!(%username, %method, "user registered");
                Ok(())
            }
            Err(e) => {
                Self::rollback(tx).await;
                Err(e)
            }
        }
    }

    /// The existence check is a fast path only. Two transactions can both pass
    /// it; the unique key on username decides, and its violation is reported
    /// exactly like a hit on the check.
    async fn create_user_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        username: &str,
        password: SecretString,
        method: SignupMethod,
    ) -> Result<(), AuthError> {
        match tx.find_by_username(username).await {
            Ok(Some(_)) => return Err(AuthError::already_exists()),
            Ok(None) => {}
            Err(e) => return Err(Self::internal("check user existence", e)),
        }

        // TODO: verify the google code with the identity provider once
        // credentials for it are provisioned; until then the row is created
        // without a password.
        let password_hash = match method {
            SignupMethod::Email => self.credential_hasher.hash_password(&password).await?,
            SignupMethod::Google => String::new(),
        };
        drop(password);

        match tx.insert_user(username, &password_hash, method).await {
            Ok(_) => Ok(()),
            Err(StoreError::UniqueViolation) => {
                debug!(%username, "lost signup race on unique key");
                Err(AuthError::already_exists())
            }
            Err(e) => Err(Self::internal("insert user", e)),
        }
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        self.logger.scope(self.login_in_scope(request)).await
    }

    async fn signup(&self, request: SignupInput) -> Result<(), AuthError> {
        self.logger.scope(self.signup_in_scope(request)).await
    }
}
