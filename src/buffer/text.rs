//! テキストエンジン
//!
//! 生バイト列（不正なUTF-8も保持）とマークアリーナ、undoスナップショット、
//! アトミック保存を提供する。エディタ本体はこの狭いインターフェースだけを使う。

use super::marks::{Mark, MarkArena};
use crate::error::{BufferError, FileError, Result, TemacsError};
use std::path::Path;

/// スナップショット1件（undoチェックポイント）
#[derive(Debug, Clone)]
struct Snapshot {
    bytes: Vec<u8>,
}

/// バッファストレージエンジン
///
/// テキストはバイト列として保持し、UTF-8の解釈は読み手（描画・移動）に任せる。
#[derive(Debug, Default)]
pub struct TextEngine {
    bytes: Vec<u8>,
    marks: MarkArena,
    snapshots: Vec<Snapshot>,
    modified: bool,
}

impl TextEngine {
    /// 空のエンジンを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// バイト列からエンジンを作成
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            marks: MarkArena::new(),
            snapshots: Vec::new(),
            modified: false,
        }
    }

    /// 文字列からエンジンを作成（テスト・新規バッファ用）
    pub fn from_str(s: &str) -> Self {
        Self::from_bytes(s.as_bytes().to_vec())
    }

    /// バッファの総バイト数
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// 指定オフセットのバイト
    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }

    /// `start` から最大 `max_len` バイトを読み出す（境界でクリップ）
    pub fn bytes_in_range(&self, start: usize, max_len: usize) -> &[u8] {
        let start = start.min(self.bytes.len());
        let end = start.saturating_add(max_len).min(self.bytes.len());
        &self.bytes[start..end]
    }

    /// `[start, end)` のコピーを取得
    pub fn copy_range(&self, start: usize, end: usize) -> Vec<u8> {
        let start = start.min(self.bytes.len());
        let end = end.clamp(start, self.bytes.len());
        self.bytes[start..end].to_vec()
    }

    /// 全内容への参照（描画・検索用）
    pub fn contents(&self) -> &[u8] {
        &self.bytes
    }

    // ── マーク ──────────────────────────────────────

    pub fn mark_set(&mut self, offset: usize) -> Mark {
        self.marks.create(offset.min(self.bytes.len()))
    }

    pub fn mark_get(&self, mark: Mark) -> usize {
        self.marks.resolve(mark)
    }

    pub fn mark_move(&mut self, mark: Mark, offset: usize) {
        self.marks.move_to(mark, offset.min(self.bytes.len()));
    }

    pub fn mark_copy(&mut self, mark: Mark) -> Mark {
        self.marks.duplicate(mark)
    }

    pub fn mark_release(&mut self, mark: Mark) {
        self.marks.release(mark);
    }

    // ── 編集 ──────────────────────────────────────

    /// バイト列を挿入
    pub fn insert(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        if offset > self.bytes.len() {
            return Err(self.out_of_bounds(offset));
        }
        self.bytes.splice(offset..offset, data.iter().copied());
        self.marks.shift_for_insert(offset, data.len());
        self.modified = true;
        Ok(())
    }

    /// `offset` から `len` バイトを削除
    pub fn delete(&mut self, offset: usize, len: usize) -> Result<()> {
        let end = offset.saturating_add(len);
        if end > self.bytes.len() {
            return Err(self.out_of_bounds(end));
        }
        self.bytes.drain(offset..end);
        self.marks.shift_for_delete(offset, len);
        self.modified = true;
        Ok(())
    }

    /// `[start, end)` を削除
    pub fn delete_range(&mut self, start: usize, end: usize) -> Result<()> {
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        self.delete(lo, hi - lo)
    }

    // ── undo ──────────────────────────────────────

    /// undoチェックポイントを開く（現内容のスナップショット）
    pub fn snapshot(&mut self) {
        self.snapshots.push(Snapshot {
            bytes: self.bytes.clone(),
        });
    }

    /// 直近 `n` 個のチェックポイントを遡って復元
    ///
    /// 連続undoはチェックポイントを1つずつ消費して古い状態へ歩く。
    pub fn restore(&mut self, n: usize) -> Result<()> {
        if n == 0 || self.snapshots.len() < n {
            return Err(TemacsError::Buffer(BufferError::NoUndo));
        }
        self.snapshots.truncate(self.snapshots.len() - (n - 1));
        let snapshot = self
            .snapshots
            .pop()
            .ok_or(TemacsError::Buffer(BufferError::NoUndo))?;
        self.bytes = snapshot.bytes;
        self.marks.clamp_to(self.bytes.len());
        self.modified = true;
        Ok(())
    }

    /// 保持しているチェックポイント数
    pub fn checkpoints(&self) -> usize {
        self.snapshots.len()
    }

    // ── 状態 ──────────────────────────────────────

    pub fn modified(&self) -> bool {
        self.modified
    }

    pub fn set_saved(&mut self) {
        self.modified = false;
    }

    /// アトミック保存（同一ディレクトリの一時ファイルへ書いてrename）
    pub fn save(&mut self, path: &Path) -> Result<()> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .ok_or_else(|| {
                TemacsError::File(FileError::InvalidPath {
                    path: path.display().to_string(),
                })
            })?
            .to_string_lossy();
        let tmp_path = dir.join(format!(".{}.temacs~", file_name));

        std::fs::write(&tmp_path, &self.bytes)?;
        if let Err(err) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(err.into());
        }

        self.modified = false;
        Ok(())
    }

    fn out_of_bounds(&self, offset: usize) -> TemacsError {
        TemacsError::Buffer(BufferError::OutOfBounds {
            offset,
            size: self.bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_delete_update_marks() {
        let mut engine = TextEngine::from_str("hello world");
        let mark = engine.mark_set(6); // "world" の先頭

        engine.insert(0, b">> ").expect("insert");
        assert_eq!(engine.mark_get(mark), 9);
        assert_eq!(engine.contents(), b">> hello world");

        engine.delete(0, 3).expect("delete");
        assert_eq!(engine.mark_get(mark), 6);
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let mut engine = TextEngine::from_str("abc");
        engine.snapshot();
        engine.insert(3, b"def").expect("insert");
        engine.snapshot();
        engine.insert(6, b"ghi").expect("insert");

        engine.restore(1).expect("one step back");
        assert_eq!(engine.contents(), b"abcdef");

        engine.restore(1).expect("another step back");
        assert_eq!(engine.contents(), b"abc");

        assert!(engine.restore(1).is_err());
    }

    #[test]
    fn restore_multiple_steps_at_once() {
        let mut engine = TextEngine::from_str("");
        for chunk in [b"a", b"b", b"c"] {
            engine.snapshot();
            let at = engine.size();
            engine.insert(at, chunk).expect("insert");
        }

        engine.restore(3).expect("walk all the way back");
        assert_eq!(engine.contents(), b"");
        assert_eq!(engine.checkpoints(), 0);
    }

    #[test]
    fn bytes_in_range_clips_to_buffer() {
        let engine = TextEngine::from_str("short");
        assert_eq!(engine.bytes_in_range(0, 100), b"short");
        assert_eq!(engine.bytes_in_range(3, 100), b"rt");
        assert_eq!(engine.bytes_in_range(10, 4), b"");
    }

    #[test]
    fn save_writes_atomically() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        let mut engine = TextEngine::from_str("content\n");
        engine.insert(0, b"# ").expect("insert");
        assert!(engine.modified());

        engine.save(&path).expect("save");
        assert!(!engine.modified());
        assert_eq!(std::fs::read(&path).expect("read"), b"# content\n");

        // 一時ファイルが残らない
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read_dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with("~"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
