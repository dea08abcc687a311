use crate::errors::{AppError, AuthError, FetchError, StoreError};
use crate::fetcher::{fetch_and_store, list_masked};
use crate::models::Credentials;
use crate::token_storage::TokenStore;
use crate::traits::{Authenticator, MessageHandler};
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Alice Blue token fetcher - stores session tokens per user in a local JSON file
#[derive(Parser, Debug)]
#[command(name = "alice-tokens", version)]
#[command(about = "Fetch Alice Blue session tokens and keep them in a local JSON file", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Logging level (overrides the config file)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Tokens file to read and write (default: .alice.tokens.json)
    #[arg(short = 'f', long, value_name = "FILE")]
    pub tokens_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List all stored tokens (masked)
    List,

    /// Fetch a token for a user and store it
    Add(AddArgs),

    /// Remove a user's stored token
    Remove(RemoveArgs),
}

#[derive(Args, Clone)]
pub struct AddArgs {
    /// Alice Blue username / client ID
    pub username: String,

    /// Alice Blue password ("-" to prompt)
    pub password: String,

    /// Alice Blue API key
    pub api_key: String,

    /// Alice Blue API secret
    pub api_secret: String,
}

#[derive(Args, Debug, Clone)]
pub struct RemoveArgs {
    /// Username whose token should be removed
    pub username: String,
}

pub fn parse_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Exit code for a failed parse: help and version requests succeed, everything else is a usage error.
pub fn usage_exit_code(error: &clap::Error) -> u8 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

impl std::fmt::Debug for AddArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddArgs")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

impl AddArgs {
    /// A password of `-` is read through `prompt` instead of the command line.
    fn into_credentials<P>(self, prompt: P) -> Result<Credentials, AuthError>
    where
        P: FnOnce(&str) -> std::io::Result<String>,
    {
        let password = if self.password == "-" {
            prompt(&format!("Password for {}: ", self.username))
                .map_err(|e| AuthError::PasswordPrompt { source: e })?
        } else {
            self.password
        };

        Ok(Credentials::new(
            self.username,
            password,
            self.api_key,
            self.api_secret,
        ))
    }
}

pub async fn handle_add_command<A: Authenticator>(
    args: AddArgs,
    authenticator: &A,
    store: &TokenStore,
    out: &dyn MessageHandler,
) -> Result<(), AppError> {
    let credentials = args
        .into_credentials(|prompt| rpassword::prompt_password(prompt))
        .map_err(FetchError::from)?;

    out.print(&format!(
        "Connecting to Alice Blue for user: {}",
        credentials.username
    ));

    let stored = fetch_and_store(authenticator, &credentials, store)
        .await
        .inspect_err(|e| {
            if e.is_auth_failure() {
                tracing::warn!("Authentication failed for {}: {}", credentials.username, e);
            } else {
                tracing::error!("Failed to store token for {}: {}", credentials.username, e);
            }
        })?;

    out.print(&format!("Token saved to {}", store.path().display()));
    out.print(&format!("   User: {}", stored.username));
    out.print(&format!("   Token: {}", stored.masked));
    Ok(())
}

/// Lists stored tokens. Read problems are reported but never fail the command.
pub fn handle_list_command(store: &TokenStore, out: &dyn MessageHandler) {
    let report = |e: StoreError| {
        tracing::warn!("Failed to list tokens from {:?}: {}", store.path(), e);
        out.eprint(&format!("Error reading tokens: {}", e));
    };

    match list_masked(store) {
        Ok(None) => {
            out.print(&format!(
                "No tokens file found at {}",
                store.path().display()
            ));
        }
        Ok(Some(listing)) => {
            out.print(&format!("Stored tokens in {}:", store.path().display()));
            for (username, masked) in listing.entries {
                out.print(&format!("  • {}: {}", username, masked));
            }
            if let Some(e) = listing.invalid {
                report(e);
            }
        }
        Err(e) => report(e),
    }
}

pub fn handle_remove_command(
    args: RemoveArgs,
    store: &TokenStore,
    out: &dyn MessageHandler,
) -> Result<(), AppError> {
    if store.remove(&args.username)? {
        out.print(&format!(
            "Removed token for {} from {}",
            args.username,
            store.path().display()
        ));
        Ok(())
    } else {
        Err(AppError::UserNotFound {
            username: args.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_source::TokenSource;
    use crate::traits::testing::CapturingMessageHandler;
    use secrecy::{ExposeSecret, SecretString};
    use std::fs;
    use tempfile::tempdir;

    struct StaticToken(&'static str);

    impl TokenSource for StaticToken {
        fn try_get_token(&self) -> Option<SecretString> {
            Some(SecretString::new(self.0.to_string()))
        }
    }

    struct StaticAuthenticator(&'static str);

    impl Authenticator for StaticAuthenticator {
        async fn authenticate(
            &self,
            _credentials: &Credentials,
        ) -> Result<Box<dyn TokenSource>, AuthError> {
            Ok(Box::new(StaticToken(self.0)))
        }
    }

    #[test]
    fn test_parse_add() {
        let cli = parse_from(["alice-tokens", "add", "alice", "pw1", "key1", "secret1"]).unwrap();
        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.username, "alice");
                assert_eq!(args.password, "pw1");
                assert_eq!(args.api_key, "key1");
                assert_eq!(args.api_secret, "secret1");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_options() {
        let cli = parse_from([
            "alice-tokens",
            "--tokens-file",
            "custom.json",
            "-l",
            "debug",
            "list",
        ])
        .unwrap();
        assert_eq!(cli.tokens_file, Some(PathBuf::from("custom.json")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn test_usage_errors_exit_with_one() {
        let no_args = parse_from(["alice-tokens"]).unwrap_err();
        assert_eq!(usage_exit_code(&no_args), 1);

        let unknown = parse_from(["alice-tokens", "frobnicate"]).unwrap_err();
        assert_eq!(unknown.kind(), ErrorKind::InvalidSubcommand);
        assert_eq!(usage_exit_code(&unknown), 1);

        let missing = parse_from(["alice-tokens", "add", "alice", "pw1"]).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(usage_exit_code(&missing), 1);
    }

    #[test]
    fn test_help_exits_with_zero() {
        let help = parse_from(["alice-tokens", "--help"]).unwrap_err();
        assert_eq!(usage_exit_code(&help), 0);
    }

    #[tokio::test]
    async fn test_handle_add_prints_masked_confirmation() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join(".alice.tokens.json"));
        let out = CapturingMessageHandler::default();
        let args = AddArgs {
            username: "alice".to_string(),
            password: "pw1".to_string(),
            api_key: "key1".to_string(),
            api_secret: "secret1".to_string(),
        };

        handle_add_command(args, &StaticAuthenticator("TOK1234567890ABCD"), &store, &out)
            .await
            .unwrap();

        let stdout = out.stdout_text();
        assert!(stdout.contains("Connecting to Alice Blue for user: alice"));
        assert!(stdout.contains("Token: TOK1234567...ABCD"));
        assert!(!stdout.contains("TOK1234567890ABCD"));
    }

    #[test]
    fn test_handle_list_missing_file() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("missing.json"));
        let out = CapturingMessageHandler::default();

        handle_list_command(&store, &out);

        assert!(out.stdout_text().starts_with("No tokens file found at"));
        assert!(out.stderr_text().is_empty());
    }

    #[test]
    fn test_handle_list_prints_masked_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(
            &path,
            r#"{"alice": "TOK1234567890ABCD", "bob": "BOBTOKEN0987654321"}"#,
        )
        .unwrap();
        let out = CapturingMessageHandler::default();

        handle_list_command(&TokenStore::new(&path), &out);

        let lines = out.stdout.lock().unwrap().clone();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "  • alice: TOK1234567...ABCD");
        assert_eq!(lines[2], "  • bob: BOBTOKEN09...4321");
    }

    #[test]
    fn test_handle_list_empty_store_prints_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, "{}").unwrap();
        let out = CapturingMessageHandler::default();

        handle_list_command(&TokenStore::new(&path), &out);

        let lines = out.stdout.lock().unwrap().clone();
        assert_eq!(lines, vec![format!("Stored tokens in {}:", path.display())]);
        assert!(out.stderr_text().is_empty());
    }

    #[test]
    fn test_handle_list_prints_entries_before_invalid_one() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(
            &path,
            r#"{"alice": "TOK1234567890ABCD", "legacy": 42, "bob": "BOBTOKEN0987654321"}"#,
        )
        .unwrap();
        let out = CapturingMessageHandler::default();

        handle_list_command(&TokenStore::new(&path), &out);

        let lines = out.stdout.lock().unwrap().clone();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "  • alice: TOK1234567...ABCD");
        let stderr = out.stderr_text();
        assert!(stderr.starts_with("Error reading tokens:"));
        assert!(stderr.contains("legacy"));
    }

    #[test]
    fn test_handle_list_reports_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, "{{{").unwrap();
        let out = CapturingMessageHandler::default();

        handle_list_command(&TokenStore::new(&path), &out);

        assert!(out.stderr_text().starts_with("Error reading tokens:"));
    }

    fn add_args(password: &str) -> AddArgs {
        AddArgs {
            username: "alice".to_string(),
            password: password.to_string(),
            api_key: "key1".to_string(),
            api_secret: "secret1".to_string(),
        }
    }

    #[test]
    fn test_add_args_debug_hides_secrets() {
        let cli = parse_from(["alice-tokens", "add", "alice", "hunter2", "key1", "s3cr3t"]).unwrap();
        let debug = format!("{:?}", cli);

        assert!(debug.contains("alice"));
        assert!(debug.contains("key1"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("s3cr3t"));
    }

    #[test]
    fn test_dash_password_is_prompted() {
        let credentials = add_args("-")
            .into_credentials(|prompt| {
                assert_eq!(prompt, "Password for alice: ");
                Ok("typed-pw".to_string())
            })
            .unwrap();

        assert_eq!(credentials.password.expose_secret(), "typed-pw");
        assert_eq!(credentials.api_secret.expose_secret(), "secret1");
    }

    #[test]
    fn test_literal_password_skips_prompt() {
        let credentials = add_args("pw1")
            .into_credentials(|_| panic!("prompted for a password given on the command line"))
            .unwrap();

        assert_eq!(credentials.password.expose_secret(), "pw1");
    }

    #[test]
    fn test_prompt_failure_is_reported() {
        let result = add_args("-").into_credentials(|_| {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no tty"))
        });

        assert!(matches!(result, Err(AuthError::PasswordPrompt { .. })));
    }

    #[test]
    fn test_handle_remove_unknown_user() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, r#"{"alice": "TOK1234567890ABCD"}"#).unwrap();
        let out = CapturingMessageHandler::default();

        let result = handle_remove_command(
            RemoveArgs {
                username: "bob".to_string(),
            },
            &TokenStore::new(&path),
            &out,
        );

        assert!(matches!(result, Err(AppError::UserNotFound { ref username }) if username == "bob"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"{"alice": "TOK1234567890ABCD"}"#
        );
    }
}
