//! UIモジュール
//!
//! バッファ内容を文字グリッドへ描画するビューポートと、
//! フロントエンドが端末へ写すグリッド表現。

pub mod grid;
pub mod viewport;

pub use grid::{Cell, RenderedGrid};
pub use viewport::Viewport;
