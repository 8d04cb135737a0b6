//! 検索モジュール
//!
//! インクリメンタル検索（1文字ごとの再検索）と正規表現による
//! バッファ全体検索を提供する。

pub mod incremental;
pub mod pattern;

pub use incremental::{Direction, IncrementalSearch};
pub use pattern::search_pattern;
