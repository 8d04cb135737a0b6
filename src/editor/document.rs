//! ドキュメント
//!
//! 開いている1ファイル分の状態。エンジンハンドル、ポイント（カーソル）、
//! マーク（選択アンカー）、目標カラム、直前アクションタグ、検索マッチ範囲を持つ。

use crate::buffer::{Mark, TextEngine};
use crate::error::{BufferError, Result, TemacsError};
use std::path::PathBuf;

/// 直前に実行された編集アクションの種別
///
/// undo/キルの合流（coalescing）判定にのみ使う。ペイロードは持たない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionTag {
    #[default]
    Other,
    Insert,
    Yank,
    Undo,
    Backspace,
    KillToEol,
    KillWord,
    BackwardKillWord,
}

impl ActionTag {
    /// 同種連続で1つのundoステップに合流できるか
    pub fn coalesces(self) -> bool {
        matches!(
            self,
            ActionTag::Insert
                | ActionTag::Backspace
                | ActionTag::KillToEol
                | ActionTag::KillWord
                | ActionTag::BackwardKillWord
        )
    }
}

/// 開いている1ファイルの編集状態
#[derive(Debug)]
pub struct Document {
    engine: TextEngine,
    point: Mark,
    mark: Mark,
    /// 縦移動時に維持する表示カラム（タブ展開済み）
    pub target_column: usize,
    pub last_action: ActionTag,
    /// 検索ハイライト用のマッチ範囲
    pub match_range: Option<(usize, usize)>,
    pub display_name: String,
    pub file_path: Option<PathBuf>,
    /// スナップショットごとの (point, mark) オフセット
    undo_positions: Vec<(usize, usize)>,
    tab_width: usize,
}

impl Document {
    /// バイト列からドキュメントを作成
    pub fn from_bytes(bytes: Vec<u8>, display_name: String, file_path: Option<PathBuf>) -> Self {
        let mut engine = TextEngine::from_bytes(bytes);
        let point = engine.mark_set(0);
        let mark = engine.mark_set(0);
        Self {
            engine,
            point,
            mark,
            target_column: 0,
            last_action: ActionTag::Other,
            match_range: None,
            display_name,
            file_path,
            undo_positions: Vec::new(),
            tab_width: 8,
        }
    }

    /// 空のドキュメント（テスト・新規バッファ用）
    pub fn from_str(s: &str) -> Self {
        Self::from_bytes(s.as_bytes().to_vec(), "*scratch*".to_string(), None)
    }

    /// タブ幅を設定
    pub fn set_tab_width(&mut self, tab_width: usize) {
        self.tab_width = tab_width.max(1);
    }

    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    pub fn engine(&self) -> &TextEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TextEngine {
        &mut self.engine
    }

    // ── ポイント/マーク ────────────────────────────

    pub fn point(&self) -> usize {
        self.engine.mark_get(self.point)
    }

    pub fn mark(&self) -> usize {
        self.engine.mark_get(self.mark)
    }

    pub fn set_point(&mut self, offset: usize) {
        self.engine.mark_move(self.point, offset);
    }

    pub fn set_mark_at_point(&mut self) {
        let point = self.point();
        self.engine.mark_move(self.mark, point);
    }

    pub fn set_mark(&mut self, offset: usize) {
        self.engine.mark_move(self.mark, offset);
    }

    /// ポイントとマークを交換
    pub fn exchange_point_mark(&mut self) {
        let point = self.point();
        let mark = self.mark();
        self.engine.mark_move(self.point, mark);
        self.engine.mark_move(self.mark, point);
        self.update_target_column();
    }

    /// ポイントとマークの間の正規化された範囲
    pub fn region(&self) -> (usize, usize) {
        let point = self.point();
        let mark = self.mark();
        if mark <= point {
            (mark, point)
        } else {
            (point, mark)
        }
    }

    /// 目標カラムを現在のポイント位置に合わせる
    pub fn update_target_column(&mut self) {
        self.target_column = self.engine.column_at(self.point(), self.tab_width);
    }

    // ── 移動コマンド ────────────────────────────────

    /// 文字単位の移動。境界に当たったら途中まで動いて `Err` を返す。
    pub fn move_char(&mut self, mut off: isize) -> Result<()> {
        let mut point = self.point();
        let mut hit_boundary = None;
        while off != 0 {
            let forward = off > 0;
            let next = if forward {
                off -= 1;
                self.engine.char_next(point)
            } else {
                off += 1;
                self.engine.char_prev(point)
            };
            if next == point {
                hit_boundary = Some(if forward {
                    BufferError::AtEnd
                } else {
                    BufferError::AtStart
                });
                break;
            }
            point = next;
        }
        self.set_point(point);
        self.update_target_column();
        match hit_boundary {
            Some(err) => Err(TemacsError::Buffer(err)),
            None => Ok(()),
        }
    }

    /// 行単位の移動。目標カラムを維持する。
    pub fn move_line(&mut self, mut off: isize) -> Result<()> {
        let mut point = self.point();
        let mut hit_boundary = None;
        while off != 0 {
            let forward = off > 0;
            let next = if forward {
                off -= 1;
                self.engine.line_down(point)
            } else {
                off += 1;
                self.engine.line_up(point)
            };
            if next == point {
                hit_boundary = Some(if forward {
                    BufferError::AtEnd
                } else {
                    BufferError::AtStart
                });
                break;
            }
            point = next;
        }
        if self.target_column > 0 {
            point = self.engine.line_offset(point, self.target_column, self.tab_width);
        }
        self.set_point(point);
        match hit_boundary {
            Some(err) => Err(TemacsError::Buffer(err)),
            None => Ok(()),
        }
    }

    /// 段落単位の移動
    pub fn move_paragraph(&mut self, mut off: isize) -> Result<()> {
        let mut point = self.point();
        let mut hit_boundary = None;
        while off != 0 {
            let forward = off > 0;
            let next = if forward {
                off -= 1;
                self.engine.paragraph_next(point)
            } else {
                off += 1;
                self.engine.paragraph_prev(point)
            };
            if next == point {
                hit_boundary = Some(if forward {
                    BufferError::AtEnd
                } else {
                    BufferError::AtStart
                });
                break;
            }
            point = next;
        }
        self.set_point(point);
        self.update_target_column();
        match hit_boundary {
            Some(err) => Err(TemacsError::Buffer(err)),
            None => Ok(()),
        }
    }

    /// 行頭へ移動
    pub fn move_bol(&mut self) {
        let point = self.engine.line_begin(self.point());
        self.set_point(point);
        self.update_target_column();
    }

    /// 行末へ移動
    pub fn move_eol(&mut self) {
        let point = self.engine.line_end(self.point());
        self.set_point(point);
        self.update_target_column();
    }

    /// バッファ先頭へ移動
    pub fn move_buffer_start(&mut self) {
        self.set_point(0);
        self.update_target_column();
    }

    /// バッファ終端へ移動
    pub fn move_buffer_end(&mut self) {
        let size = self.engine.size();
        self.set_point(size);
        self.update_target_column();
    }

    // ── undo簿記 ──────────────────────────────────

    /// undoチェックポイントを記録（スナップショット + ポイント/マーク）
    pub fn record_undo(&mut self) {
        let positions = (self.point(), self.mark());
        self.undo_positions.push(positions);
        self.engine.snapshot();
    }

    /// 1チェックポイント分を復元
    ///
    /// 連続undoはスタックを1つずつ消費して古い状態へ歩く。
    pub fn undo(&mut self) -> Result<()> {
        self.engine.restore(1)?;
        if let Some((point, mark)) = self.undo_positions.pop() {
            let size = self.engine.size();
            self.engine.mark_move(self.point, point.min(size));
            self.engine.mark_move(self.mark, mark.min(size));
        }
        self.update_target_column();
        Ok(())
    }

    pub fn modified(&self) -> bool {
        self.engine.modified()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_char_hits_boundaries() {
        let mut doc = Document::from_str("ab");
        assert!(doc.move_char(1).is_ok());
        assert!(doc.move_char(5).is_err());
        assert_eq!(doc.point(), 2);
        assert!(doc.move_char(-2).is_ok());
        assert!(doc.move_char(-1).is_err());
        assert_eq!(doc.point(), 0);
    }

    #[test]
    fn move_line_keeps_target_column() {
        let mut doc = Document::from_str("long line here\nhi\nanother long line\n");
        doc.set_point(10);
        doc.update_target_column();

        doc.move_line(1).expect("down to short line");
        assert_eq!(doc.point(), 17); // "hi" の行末でクランプ

        doc.move_line(1).expect("down to long line");
        let column = doc.engine().column_at(doc.point(), doc.tab_width());
        assert_eq!(column, 10); // 目標カラムへ復帰
    }

    #[test]
    fn region_is_order_independent() {
        let mut doc = Document::from_str("hello");
        doc.set_point(4);
        doc.set_mark(1);
        assert_eq!(doc.region(), (1, 4));
        doc.exchange_point_mark();
        assert_eq!(doc.region(), (1, 4));
        assert_eq!(doc.point(), 1);
    }

    #[test]
    fn undo_restores_point_and_mark() {
        let mut doc = Document::from_str("abc");
        doc.set_point(2);
        doc.set_mark(1);
        doc.record_undo();
        doc.engine_mut().insert(2, b"XYZ").expect("insert");
        doc.set_point(5);

        doc.undo().expect("undo");
        assert_eq!(doc.engine().contents(), b"abc");
        assert_eq!(doc.point(), 2);
        assert_eq!(doc.mark(), 1);
        assert!(doc.undo().is_err());
    }
}
