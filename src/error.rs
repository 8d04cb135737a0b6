//! エラーハンドリングシステム
//!
//! temacs 全体で使用される統一されたエラー型を定義。
//! 通常操作中のエラーは全て非致命的で、メッセージ行のアラートとして表示される。

use thiserror::Error;

/// アプリケーション全体のエラー型
#[derive(Error, Debug)]
pub enum TemacsError {
    /// バッファ操作エラー
    #[error("Buffer operation failed")]
    Buffer(#[from] BufferError),

    /// ファイル操作エラー
    #[error("File operation failed")]
    File(#[from] FileError),

    /// UI操作エラー
    #[error("UI operation failed")]
    Ui(#[from] UiError),

    /// 入力処理エラー
    #[error("Input processing failed")]
    Input(#[from] InputError),

    /// 検索エラー
    #[error("Search failed")]
    Search(#[from] SearchError),

    /// 設定エラー
    #[error("Configuration error")]
    Config(#[from] ConfigError),

    /// アプリケーション論理エラー
    #[error("Application error: {0}")]
    Application(String),
}

/// バッファ操作固有のエラー
#[derive(Error, Debug)]
pub enum BufferError {
    #[error("Offset {offset} is out of bounds (size {size})")]
    OutOfBounds { offset: usize, size: usize },

    #[error("Beginning of buffer")]
    AtStart,

    #[error("End of buffer")]
    AtEnd,

    #[error("No further undo information")]
    NoUndo,
}

/// ファイル操作固有のエラー
#[derive(Error, Debug)]
pub enum FileError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

/// UI操作固有のエラー
#[derive(Error, Debug)]
pub enum UiError {
    #[error("Terminal initialization failed: {message}")]
    TerminalInit { message: String },

    #[error("Rendering failed: {component}")]
    RenderingFailed { component: String },
}

/// 入力処理固有のエラー
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Unknown key: {description}")]
    UnknownKey { description: String },

    #[error("Invalid argument: {arg}")]
    InvalidArgument { arg: String },

    #[error("Cancelled")]
    Cancelled,
}

/// 検索固有のエラー
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid pattern: {message}")]
    InvalidPattern { message: String },

    #[error("Not found: {pattern}")]
    NotFound { pattern: String },
}

/// 設定固有のエラー
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {path}")]
    InvalidFile { path: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl TemacsError {
    /// メッセージ行に出す1行の説明（内側のエラーの文言を使う）
    pub fn user_message(&self) -> String {
        match self {
            TemacsError::Buffer(e) => e.to_string(),
            TemacsError::File(e) => e.to_string(),
            TemacsError::Ui(e) => e.to_string(),
            TemacsError::Input(e) => e.to_string(),
            TemacsError::Search(e) => e.to_string(),
            TemacsError::Config(e) => e.to_string(),
            TemacsError::Application(message) => message.clone(),
        }
    }
}

// std::io::Error から TemacsError への変換
impl From<std::io::Error> for TemacsError {
    fn from(error: std::io::Error) -> Self {
        TemacsError::File(FileError::Io {
            message: error.to_string(),
        })
    }
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, TemacsError>;
