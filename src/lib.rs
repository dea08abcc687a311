pub mod alice_client;
pub mod cli;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod logger;
pub mod models;
pub mod token_source;
pub mod token_storage;
pub mod traits;
pub mod utils;

pub use alice_client::AliceClient;
pub use config::{Config, TokenField};
pub use errors::{AppError, AuthError, ConfigError, FetchError, StoreError};
pub use models::{Credentials, StoredToken};
pub use token_source::TokenSource;
pub use token_storage::TokenStore;
pub use traits::{Authenticator, DefaultMessageHandler, MessageHandler};
