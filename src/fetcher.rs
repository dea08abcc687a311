use crate::errors::{FetchError, StoreError};
use crate::models::{Credentials, StoredToken};
use crate::token_storage::TokenStore;
use crate::traits::Authenticator;
use crate::utils::mask_token;
use secrecy::ExposeSecret;
use serde_json::Value;

/// Authenticates `credentials` and stores the resulting token under their username.
///
/// The store is only touched once a token has been obtained, so a failed
/// authentication leaves the file exactly as it was.
pub async fn fetch_and_store<A: Authenticator>(
    authenticator: &A,
    credentials: &Credentials,
    store: &TokenStore,
) -> Result<StoredToken, FetchError> {
    let source = authenticator.authenticate(credentials).await?;

    let token = source
        .try_get_token()
        .ok_or_else(|| FetchError::TokenNotFound {
            username: credentials.username.clone(),
        })?;

    store.upsert(&credentials.username, token.expose_secret())?;

    Ok(StoredToken {
        username: credentials.username.clone(),
        masked: mask_token(token.expose_secret()),
    })
}

/// Masked entries of a tokens file, in file order.
#[derive(Debug, Default)]
pub struct MaskedListing {
    pub entries: Vec<(String, String)>,
    /// Set when listing stopped at an entry whose value is not a string.
    pub invalid: Option<StoreError>,
}

/// Masks every entry of the store. `Ok(None)` when the file is missing.
///
/// Entries before the first non-string value are still returned.
pub fn list_masked(store: &TokenStore) -> Result<Option<MaskedListing>, StoreError> {
    let Some(tokens) = store.load()? else {
        return Ok(None);
    };

    let mut listing = MaskedListing::default();
    for (username, value) in tokens {
        match value {
            Value::String(token) => {
                let masked = mask_token(&token);
                listing.entries.push((username, masked));
            }
            _ => {
                listing.invalid = Some(StoreError::InvalidEntry { username });
                break;
            }
        }
    }
    Ok(Some(listing))
}
