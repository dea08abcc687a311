//! Adapters over the two response shapes the Alice Blue token endpoint has used.
//!
//! Older deployments answer with `session_token`, newer ones with `auth_token`.
//! Which one applies is fixed by configuration ([`TokenField`]), so the response
//! is decoded into exactly one adapter instead of probing for either field.

use crate::config::TokenField;
use crate::errors::AuthError;
use crate::models::deserialize_secret_option;
use secrecy::SecretString;
use serde::Deserialize;

/// Something that may carry a session token.
pub trait TokenSource: Send {
    fn try_get_token(&self) -> Option<SecretString>;
}

/// Response carrying the token in `session_token`.
#[derive(Debug, Deserialize)]
pub struct SessionTokenResponse {
    #[serde(default, deserialize_with = "deserialize_secret_option")]
    session_token: Option<SecretString>,
}

impl TokenSource for SessionTokenResponse {
    fn try_get_token(&self) -> Option<SecretString> {
        self.session_token.clone()
    }
}

/// Response carrying the token in `auth_token`.
#[derive(Debug, Deserialize)]
pub struct AuthTokenResponse {
    #[serde(default, deserialize_with = "deserialize_secret_option")]
    auth_token: Option<SecretString>,
}

impl TokenSource for AuthTokenResponse {
    fn try_get_token(&self) -> Option<SecretString> {
        self.auth_token.clone()
    }
}

/// Decodes a response body into the adapter selected by `field`.
pub fn decode_token_source(
    field: TokenField,
    body: &str,
) -> Result<Box<dyn TokenSource>, AuthError> {
    let source: Box<dyn TokenSource> = match field {
        TokenField::SessionToken => Box::new(serde_json::from_str::<SessionTokenResponse>(body)?),
        TokenField::AuthToken => Box::new(serde_json::from_str::<AuthTokenResponse>(body)?),
    };
    Ok(source)
}
