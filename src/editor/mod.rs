//! エディタモジュール
//!
//! ドキュメント状態・キルリング・編集操作の統合モジュール

pub mod document;
pub mod kill_ring;
pub mod ops;

// 公開API
pub use document::{ActionTag, Document};
pub use kill_ring::{KillRing, SaveMode};
