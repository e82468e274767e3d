use crate::application_port::*;
use crate::domain_model::SignupMethod;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

pub const LOGIN_METHOD: &str = "/auth.Auth/Login";
pub const SIGNUP_METHOD: &str = "/auth.Auth/Signup";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcCode {
    InvalidArgument,
    Unauthenticated,
    AlreadyExists,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcStatus {
    pub code: RpcCode,
    pub message: String,
}

impl From<AuthError> for RpcStatus {
    fn from(error: AuthError) -> Self {
        let code = match &error {
            AuthError::InvalidArgument(_) => RpcCode::InvalidArgument,
            AuthError::Unauthenticated(_) => RpcCode::Unauthenticated,
            AuthError::AlreadyExists(_) => RpcCode::AlreadyExists,
            AuthError::Internal(_) => RpcCode::Internal,
        };
        RpcStatus {
            code,
            message: error.message().to_owned(),
        }
    }
}

impl From<RpcStatus> for AuthError {
    fn from(status: RpcStatus) -> Self {
        match status.code {
            RpcCode::InvalidArgument => AuthError::InvalidArgument(status.message),
            RpcCode::Unauthenticated => AuthError::Unauthenticated(status.message),
            RpcCode::AlreadyExists => AuthError::AlreadyExists(status.message),
            RpcCode::Internal => AuthError::Internal(status.message),
        }
    }
}

/// Body of every RPC response: `{"ok": ...}` or `{"error": {code, message}}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcReply<T> {
    Ok(T),
    Error(RpcStatus),
}

impl<T> RpcReply<T> {
    pub fn into_result(self) -> Result<T, AuthError> {
        match self {
            RpcReply::Ok(value) => Ok(value),
            RpcReply::Error(status) => Err(status.into()),
        }
    }
}

impl<T> From<Result<T, AuthError>> for RpcReply<T> {
    fn from(result: Result<T, AuthError>) -> Self {
        match result {
            Ok(value) => RpcReply::Ok(value),
            Err(e) => RpcReply::Error(e.into()),
        }
    }
}

/// Serde adapter keeping request secrets in `SecretString` on both ends of
/// the wire.
pub mod secret_text {
    use secrecy::{ExposeSecret, SecretString};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        secret: &SecretString,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(secret.expose_secret())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<SecretString, D::Error> {
        String::deserialize(deserializer).map(SecretString::from)
    }

    pub fn empty() -> SecretString {
        SecretString::from("")
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    #[serde(with = "secret_text")]
    pub password: SecretString,
}

impl From<LoginRequest> for LoginInput {
    fn from(request: LoginRequest) -> Self {
        LoginInput {
            username: request.username,
            password: request.password,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginReply {
    pub token: SessionToken,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    #[serde(with = "secret_text", default = "secret_text::empty")]
    pub password: SecretString,
    pub method: SignupMethod,
    #[serde(with = "secret_text", default = "secret_text::empty")]
    pub code: SecretString,
}

impl From<SignupRequest> for SignupInput {
    fn from(request: SignupRequest) -> Self {
        SignupInput {
            username: request.username,
            password: request.password,
            method: request.method,
            code: request.code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupReply {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use secrecy::ExposeSecret;
    use serde_json::json;

    #[rstest]
    #[case(AuthError::InvalidArgument("username is required".into()), "invalid_argument")]
    #[case(AuthError::invalid_credentials(), "unauthenticated")]
    #[case(AuthError::already_exists(), "already_exists")]
    #[case(AuthError::internal(), "internal")]
    fn error_reply_survives_the_wire(#[case] error: AuthError, #[case] code: &str) {
        let reply: RpcReply<LoginReply> = Err(error.clone()).into();
        let encoded = serde_json::to_value(&reply).unwrap();
        assert_eq!(encoded["error"]["code"], code);
        assert_eq!(encoded["error"]["message"], error.message());

        let decoded: RpcReply<LoginReply> = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded.into_result().unwrap_err(), error);
    }

    #[test]
    fn ok_replies_are_tagged() {
        let reply: RpcReply<SignupReply> = Ok(SignupReply {}).into();
        assert_eq!(serde_json::to_value(&reply).unwrap(), json!({"ok": {}}));

        let reply: RpcReply<LoginReply> = serde_json::from_value(json!({"ok": {"token": "t0k"}})).unwrap();
        assert_eq!(reply.into_result().unwrap().token, SessionToken("t0k".into()));
    }

    #[test]
    fn unknown_code_is_rejected() {
        let reply = serde_json::from_value::<RpcReply<SignupReply>>(
            json!({"error": {"code": "not_found", "message": "x"}}),
        );
        assert!(reply.is_err());
    }

    #[test]
    fn signup_request_defaults_optional_secrets() {
        let request: SignupRequest =
            serde_json::from_value(json!({"username": "gina", "method": "google", "code": "c"})).unwrap();
        assert_eq!(request.password.expose_secret(), "");
        assert_eq!(request.code.expose_secret(), "c");
        assert_eq!(request.method, SignupMethod::Google);
    }

    #[test]
    fn secrets_travel_on_the_wire_but_not_in_debug_output() {
        let request = LoginRequest {
            username: "bob".into(),
            password: "pass123".into(),
        };
        let printed = format!("{request:?}");
        assert!(printed.contains("bob"));
        assert!(!printed.contains("pass123"));

        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded, json!({"username": "bob", "password": "pass123"}));

        let decoded: LoginRequest = serde_json::from_value(encoded).unwrap();
        let input = LoginInput::from(decoded);
        assert_eq!(input.password.expose_secret(), "pass123");
    }

    #[test]
    fn login_request_requires_a_password_field() {
        let missing = serde_json::from_value::<LoginRequest>(json!({"username": "bob"}));
        assert!(missing.is_err());
    }
}
