use crate::config::{AliceConfig, TokenField};
use crate::errors::{AppError, AuthError};
use crate::models::Credentials;
use crate::token_source::{TokenSource, decode_token_source};
use crate::traits::Authenticator;
use reqwest::Client;
use url::Url;

/// HTTP client for the Alice Blue token endpoint.
pub struct AliceClient {
    client: Client,
    token_endpoint: Url,
    token_field: TokenField,
}

impl AliceClient {
    /// Builds the client, checking that the endpoint is usable before any credentials are sent.
    pub fn new(config: &AliceConfig) -> Result<Self, AppError> {
        let token_field = config
            .token_field()
            .map_err(|e| AppError::DependencyUnavailable {
                reason: e.to_string(),
            })?;

        let token_endpoint =
            Url::parse(config.token_endpoint.trim()).map_err(|e| AppError::DependencyUnavailable {
                reason: format!("invalid token endpoint '{}': {}", config.token_endpoint, e),
            })?;

        if !matches!(token_endpoint.scheme(), "http" | "https") {
            return Err(AppError::DependencyUnavailable {
                reason: format!(
                    "token endpoint must use http or https, got '{}'",
                    token_endpoint.scheme()
                ),
            });
        }

        let client = Client::builder()
            .user_agent(format!("alice-tokens/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::DependencyUnavailable {
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(AliceClient {
            client,
            token_endpoint,
            token_field,
        })
    }

    pub fn token_endpoint(&self) -> &Url {
        &self.token_endpoint
    }
}

impl Authenticator for AliceClient {
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Box<dyn TokenSource>, AuthError> {
        tracing::debug!(
            "Requesting session token for {} from {}",
            credentials.username,
            self.token_endpoint
        );

        let response = self
            .client
            .post(self.token_endpoint.clone())
            .form(&credentials.form_params())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                "Token endpoint rejected {} with status {}",
                credentials.username,
                status
            );
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        decode_token_source(self.token_field, &body)
    }
}
