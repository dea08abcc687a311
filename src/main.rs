use alice_tokens::cli::{self, Cli, Commands};
use alice_tokens::config::{fallback_config, load_config};
use alice_tokens::logger::setup_logging;
use alice_tokens::{AliceClient, AppError, Config, DefaultMessageHandler, MessageHandler, TokenStore};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match cli::parse_from(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(cli::usage_exit_code(&e));
        }
    };

    // Only `add` needs the authentication settings; the store commands run on
    // defaults when the config file is unusable.
    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if matches!(cli.command, Commands::Add(_)) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Warning: failed to load config, using defaults: {}", e);
            fallback_config()
        }
    };
    apply_cli_overrides(&cli, &mut config);

    // Keep the guard alive to ensure log messages are flushed
    let _guard = setup_logging(&config);

    let out = DefaultMessageHandler;
    match run(cli.command, &config, &out).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            out.eprint(&format!("Error: {}", e));
            if matches!(e, AppError::DependencyUnavailable { .. }) {
                out.eprint("Set [alice] token_endpoint (ALICE_OAUTH_TOKEN_ENDPOINT) to a reachable http(s) URL and token_field (ALICE_TOKEN_FIELD) to session_token or auth_token.");
            }
            ExitCode::FAILURE
        }
    }
}

fn apply_cli_overrides(cli: &Cli, config: &mut Config) {
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(path) = &cli.tokens_file {
        config.store.path = path.clone();
    }
}

async fn run(command: Commands, config: &Config, out: &dyn MessageHandler) -> Result<(), AppError> {
    let store = TokenStore::new(config.tokens_file());

    match command {
        Commands::List => {
            cli::handle_list_command(&store, out);
            Ok(())
        }
        Commands::Add(args) => {
            // Startup precondition: the authentication client must be usable.
            let client = AliceClient::new(&config.alice)?;
            tracing::debug!("Using token endpoint {}", client.token_endpoint());
            cli::handle_add_command(args, &client, &store, out).await
        }
        Commands::Remove(args) => cli::handle_remove_command(args, &store, out),
    }
}
