use super::wire::*;
use crate::application_port::AuthError;
use crate::logger::*;
use anyhow::anyhow;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Calls the gateway needs from the credential backend.
#[async_trait::async_trait]
pub trait AuthClient: Send + Sync {
    async fn login(&self, request: LoginRequest) -> Result<LoginReply, AuthError>;
    async fn signup(&self, request: SignupRequest) -> Result<SignupReply, AuthError>;
}

/// JSON-over-HTTP client for the backend's RPC routes.
///
/// Transport failures, timeouts and unreadable replies all surface as
/// `AuthError::Internal`; the detail is only logged.
pub struct HttpAuthClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow!("build rpc client: {e}"))?;

        Ok(HttpAuthClient {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    async fn call<Req, Resp>(&self, method: &str, request: &Req) -> Result<Resp, AuthError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, method);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(%method, "rpc transport failed: {}", e);
                AuthError::internal()
            })?;

        let status = response.status();
        let reply: RpcReply<Resp> = response.json().await.map_err(|e| {
            error!(%method, %status, "rpc reply unreadable: {}", e);
            AuthError::internal()
        })?;

        reply.into_result()
    }
}

#[async_trait::async_trait]
impl AuthClient for HttpAuthClient {
    async fn login(&self, request: LoginRequest) -> Result<LoginReply, AuthError> {
        self.call(LOGIN_METHOD, &request).await
    }

    async fn signup(&self, request: SignupRequest) -> Result<SignupReply, AuthError> {
        self.call(SIGNUP_METHOD, &request).await
    }
}
