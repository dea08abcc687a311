use crate::errors::AuthError;
use crate::models::Credentials;
use crate::token_source::TokenSource;

/// Trait for the external authentication service, allowing the fetch flow to be tested
/// without network access
pub trait Authenticator: Send + Sync {
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = Result<Box<dyn TokenSource>, AuthError>> + Send;
}

/// Trait for handling printing messages to console, allowing for testable output
pub trait MessageHandler: Send + Sync {
    fn print(&self, message: &str);
    fn eprint(&self, message: &str);
}

/// Default implementation that calls println!/eprintln!
pub struct DefaultMessageHandler;

impl MessageHandler for DefaultMessageHandler {
    fn print(&self, message: &str) {
        println!("{}", message);
    }

    fn eprint(&self, message: &str) {
        eprintln!("{}", message);
    }
}
