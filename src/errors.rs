use thiserror::Error;

/// アプリケーション全体のエラー型
#[derive(Error, Debug)]
pub enum AppError {
    /// 設定関連エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// トークンストア関連エラー
    #[error("Token store error: {0}")]
    Store(#[from] StoreError),

    /// トークン取得エラー
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// 認証クライアントが利用できない（起動時の前提条件チェック）
    #[error("Alice Blue authentication client unavailable: {reason}")]
    DependencyUnavailable { reason: String },

    /// 指定されたユーザーのトークンが存在しない
    #[error("No token stored for user {username}")]
    UserNotFound { username: String },
}

/// 認証関連エラー
#[derive(Error, Debug)]
pub enum AuthError {
    /// HTTPリクエストエラー
    #[error("Request error: {source}")]
    RequestError {
        #[source]
        source: reqwest::Error,
    },

    /// JSONパースエラー
    #[error("JSON parsing error: {source}")]
    JsonError {
        #[source]
        source: serde_json::Error,
    },

    /// 認証サーバーが資格情報を拒否した
    #[error("Authentication rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// パスワード入力エラー
    #[error("Failed to read password: {source}")]
    PasswordPrompt {
        #[source]
        source: std::io::Error,
    },
}

/// トークン取得処理のエラー
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// レスポンスにトークンが含まれていない
    #[error("Could not extract token from session for user {username}")]
    TokenNotFound { username: String },

    #[error("{0}")]
    Store(#[from] StoreError),
}

/// トークンストア関連エラー
#[derive(Error, Debug)]
pub enum StoreError {
    /// ファイル読み込みエラー
    #[error("Failed to read tokens file: {source}")]
    ReadError {
        #[source]
        source: std::io::Error,
    },

    /// JSONパースエラー
    #[error("Failed to parse tokens file: {source}")]
    ParseError {
        #[source]
        source: serde_json::Error,
    },

    /// ファイル書き込みエラー
    #[error("Failed to write tokens file: {source}")]
    WriteError {
        #[source]
        source: std::io::Error,
    },

    /// トップレベルがJSONオブジェクトではない
    #[error("Tokens file does not contain a JSON object")]
    NotAnObject,

    /// 値が文字列ではないエントリ
    #[error("Token for user '{username}' is not a string")]
    InvalidEntry { username: String },
}

/// 設定関連エラー
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 設定ファイル読み込みエラー
    #[error("Failed to load config file: {source}")]
    LoadError {
        #[source]
        source: std::io::Error,
    },

    /// 設定ファイルパースエラー
    #[error("Failed to parse config file: {source}")]
    ParseError {
        #[source]
        source: toml::de::Error,
    },

    /// 設定バリデーションエラー
    #[error("Configuration validation failed: {reason}")]
    ValidationError { reason: String },
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        AuthError::RequestError { source: error }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        AuthError::JsonError { source: error }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::ParseError { source: error }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        ConfigError::LoadError { source: error }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(error: toml::de::Error) -> Self {
        ConfigError::ParseError { source: error }
    }
}

impl FetchError {
    /// Whether the failure happened before anything touched the tokens file.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, FetchError::Auth(_) | FetchError::TokenNotFound { .. })
    }
}

impl StoreError {
    /// The file exists but its contents are not a usable token map
    /// (bad UTF-8, invalid JSON, or not an object).
    pub fn is_corrupt_content(&self) -> bool {
        match self {
            StoreError::ReadError { source } => source.kind() == std::io::ErrorKind::InvalidData,
            StoreError::ParseError { .. } | StoreError::NotAnObject => true,
            StoreError::WriteError { .. } | StoreError::InvalidEntry { .. } => false,
        }
    }
}
