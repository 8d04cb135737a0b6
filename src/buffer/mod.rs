//! バッファエンジンモジュール
//!
//! 生バイトテキスト・マーク・undoスナップショット・移動プリミティブを提供。
//! エディタ本体（編集・描画・検索）はこの狭いインターフェースだけを消費する。

pub mod marks;
pub mod motion;
pub mod text;

// 公開API
pub use marks::Mark;
pub use motion::decode_utf8;
pub use text::TextEngine;
