//! 入力処理モジュール
//!
//! キー入力の正規化とキーマップによるコマンド解決を提供する。

pub mod keybinding;

pub use keybinding::{Command, Dispatch, Key, KeyCode, Keymap};
