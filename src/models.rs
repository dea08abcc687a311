use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Credentials for one Alice Blue account.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    pub api_key: String,
    pub api_secret: SecretString,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: SecretString::new(password.into()),
            api_key: api_key.into(),
            api_secret: SecretString::new(api_secret.into()),
        }
    }

    /// Form body for the password grant against the token endpoint.
    pub(crate) fn form_params(&self) -> [(&'static str, &str); 5] {
        [
            ("grant_type", "password"),
            ("username", &self.username),
            ("password", self.password.expose_secret()),
            ("client_id", &self.api_key),
            ("client_secret", self.api_secret.expose_secret()),
        ]
    }
}

/// A token saved to the store, as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredToken {
    pub username: String,
    pub masked: String,
}

// Empty strings count as absent so they never reach the store.
pub fn deserialize_secret_option<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.is_empty()).map(SecretString::new))
}
