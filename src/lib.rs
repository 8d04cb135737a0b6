//! temacs - Tiny Emacs-style terminal text editor
//!
//! バイト列バッファの上にEmacs風の編集・キルリング・undo・
//! インクリメンタル検索を実装する。

// コアモジュール
pub mod app;
pub mod config;
pub mod error;
pub mod frontend;
pub mod logging;

// データ層
pub mod buffer;
pub mod file;

// 編集層
pub mod editor;

// ロジック層
pub mod input;
pub mod minibuffer;
pub mod search;

// 表示層
pub mod ui;

// 公開API
pub use app::Editor;
pub use error::{Result, TemacsError};
pub use frontend::Tui;
