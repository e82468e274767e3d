use crate::application_port::{SessionToken, TokenIssuer};
use nanoid::nanoid;

const TOKEN_LEN: usize = 43;

/// Issues random URL-safe bearer strings (about 256 bits of entropy).
/// Tokens carry no claims and are not tied to the username.
#[derive(Debug, Default)]
pub struct RandomTokenIssuer;

impl RandomTokenIssuer {
    pub fn new() -> Self {
        Self
    }
}

impl TokenIssuer for RandomTokenIssuer {
    fn issue(&self, _username: &str) -> SessionToken {
        SessionToken(nanoid!(TOKEN_LEN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tokens_are_non_empty_and_distinct() {
        let issuer = RandomTokenIssuer::new();
        let tokens: HashSet<String> = (0..100).map(|_| issuer.issue("bob").0).collect();
        assert_eq!(tokens.len(), 100);
        assert!(tokens.iter().all(|t| t.len() == TOKEN_LEN));
    }
}
