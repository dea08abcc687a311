use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://a3.aliceblueonline.com/oauth/token";
pub const DEFAULT_TOKENS_FILE: &str = ".alice.tokens.json";

const ENV_TOKEN_ENDPOINT: &str = "ALICE_OAUTH_TOKEN_ENDPOINT";
const ENV_TOKEN_FIELD: &str = "ALICE_TOKEN_FIELD";
const ENV_TOKENS_FILE: &str = "ALICE_OAUTH_TOKENS_FILE";

/// 認証レスポンスのどのフィールドからトークンを読むか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenField {
    #[default]
    SessionToken,
    AuthToken,
}

impl TokenField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenField::SessionToken => "session_token",
            TokenField::AuthToken => "auth_token",
        }
    }
}

impl std::str::FromStr for TokenField {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "session_token" => Ok(TokenField::SessionToken),
            "auth_token" => Ok(TokenField::AuthToken),
            other => Err(ConfigError::ValidationError {
                reason: format!(
                    "unknown token field '{}', expected 'session_token' or 'auth_token'",
                    other
                ),
            }),
        }
    }
}

/// Alice Blue 認証設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliceConfig {
    /// トークンエンドポイントURL
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,

    /// トークンを読み取るレスポンスフィールド（`add` 実行時に検証）
    #[serde(default = "default_token_field")]
    pub token_field: String,
}

fn default_token_endpoint() -> String {
    DEFAULT_TOKEN_ENDPOINT.to_string()
}

fn default_token_field() -> String {
    TokenField::default().as_str().to_string()
}

impl AliceConfig {
    pub fn token_field(&self) -> Result<TokenField, ConfigError> {
        self.token_field.parse()
    }
}

impl Default for AliceConfig {
    fn default() -> Self {
        Self {
            token_endpoint: default_token_endpoint(),
            token_field: default_token_field(),
        }
    }
}

/// トークンストア設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// トークンJSONファイルのパス（省略可、デフォルト: カレントディレクトリの .alice.tokens.json）
    #[serde(default = "default_tokens_file")]
    pub path: PathBuf,
}

fn default_tokens_file() -> PathBuf {
    PathBuf::from(DEFAULT_TOKENS_FILE)
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_tokens_file(),
        }
    }
}

/// ログ設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// ログレベル（省略可、デフォルト: warn）
    #[serde(default = "default_log_level")]
    pub level: String,

    /// ログファイルのパス（省略時は標準エラー出力）
    #[serde(default)]
    pub file_path: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Alice Blue 認証設定
    #[serde(default)]
    pub alice: AliceConfig,

    /// トークンストア設定
    #[serde(default)]
    pub store: StoreConfig,

    /// ログ設定
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn log_level(&self) -> &str {
        &self.logging.level
    }

    pub fn log_file_path(&self) -> &Option<String> {
        &self.logging.file_path
    }

    pub fn tokens_file(&self) -> &Path {
        &self.store.path
    }

    /// 環境変数による上書きを適用する
    ///
    /// エンドポイントとトークンフィールドは検証しない。`add` だけが使うため、
    /// `AliceClient::new` がそこで検証する。
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_TOKEN_ENDPOINT) {
            self.alice.token_endpoint = endpoint;
        }
        if let Some(field) = lookup(ENV_TOKEN_FIELD) {
            self.alice.token_field = field;
        }
        if let Some(path) = lookup(ENV_TOKENS_FILE) {
            self.store.path = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError {
                reason: "store.path must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// 設定ファイルのパスを取得
fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push("alice-tokens");
        path.push("config.toml");
        path
    })
}

/// 設定ファイルを読み込む
///
/// `explicit_path` が指定された場合はそのファイルが必須。
/// 指定がない場合、デフォルトの場所にファイルがなければデフォルト設定を返す。
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match explicit_path {
        Some(path) => parse_config_file(path)?,
        None => match config_file_path() {
            Some(path) if path.exists() => parse_config_file(&path)?,
            _ => Config::default(),
        },
    };

    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

/// 設定ファイルが使えない場合の設定（デフォルト + 環境変数）
pub fn fallback_config() -> Config {
    let mut config = Config::default();
    config.apply_env_overrides();
    config
}

fn parse_config_file(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}
