//! キルリング実装
//!
//! キルされたバイト列の有界履歴。最新エントリが常に先頭（index 0）で、
//! yank-pop用の巡回カーソルを別に持つ。

use std::collections::VecDeque;

const DEFAULT_CAPACITY: usize = 32;

/// キル保存時の結合モード
///
/// 同種キルの連続時にだけ Append/Prepend が選ばれ、
/// 最新エントリが1つの伸びるエントリとして育つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// 新しい最新エントリを作る
    Replace,
    /// 最新エントリの末尾に結合
    Append,
    /// 最新エントリの先頭に結合
    Prepend,
}

/// Emacs風キルリング
#[derive(Debug)]
pub struct KillRing {
    entries: VecDeque<Vec<u8>>,
    capacity: usize,
    /// yank-pop用の巡回カーソル（0 = 最新）
    cursor: usize,
}

impl KillRing {
    /// 新しいキルリングを作成
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// 最大保持数を設定して作成
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            cursor: 0,
        }
    }

    /// キルしたバイト列を保存（空は無視）
    ///
    /// どのモードでも巡回カーソルは最新へ戻る。
    pub fn save(&mut self, span: &[u8], mode: SaveMode) {
        if span.is_empty() {
            return;
        }
        self.cursor = 0;

        match mode {
            SaveMode::Replace => {
                if self.entries.len() == self.capacity {
                    self.entries.pop_back();
                }
                self.entries.push_front(span.to_vec());
            }
            SaveMode::Append => match self.entries.front_mut() {
                Some(front) => front.extend_from_slice(span),
                None => self.entries.push_front(span.to_vec()),
            },
            SaveMode::Prepend => match self.entries.front_mut() {
                Some(front) => {
                    let mut joined = Vec::with_capacity(span.len() + front.len());
                    joined.extend_from_slice(span);
                    joined.extend_from_slice(front);
                    *front = joined;
                }
                None => self.entries.push_front(span.to_vec()),
            },
        }
    }

    /// 巡回カーソル位置のエントリ
    pub fn current(&self) -> Option<&[u8]> {
        self.entries.get(self.cursor).map(Vec::as_slice)
    }

    /// 最新エントリ（yankはここを使う）
    pub fn newest(&self) -> Option<&[u8]> {
        self.entries.front().map(Vec::as_slice)
    }

    /// カーソルを1つ古いエントリへ巡回し、新しいyank対象を返す
    ///
    /// 最古を越えたら最新へ折り返す。
    pub fn rotate(&mut self) -> Option<&[u8]> {
        if self.entries.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1) % self.entries.len();
        self.current()
    }

    /// カーソルを最新へ戻す
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    /// エントリ数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// エントリをクリア
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl Default for KillRing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_creates_newest_entry() {
        let mut ring = KillRing::new();
        ring.save(b"foo", SaveMode::Replace);
        ring.save(b"bar", SaveMode::Replace);
        assert_eq!(ring.newest(), Some(&b"bar"[..]));
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn append_and_prepend_grow_the_newest_entry() {
        let mut ring = KillRing::new();
        ring.save(b"bar", SaveMode::Append);
        assert_eq!(ring.newest(), Some(&b"bar"[..]));

        ring.save(b"baz", SaveMode::Append);
        assert_eq!(ring.newest(), Some(&b"barbaz"[..]));

        ring.save(b"foo", SaveMode::Prepend);
        assert_eq!(ring.newest(), Some(&b"foobarbaz"[..]));
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn rotate_cycles_and_wraps() {
        let mut ring = KillRing::new();
        ring.save(b"first", SaveMode::Replace);
        ring.save(b"second", SaveMode::Replace);
        ring.save(b"third", SaveMode::Replace);

        assert_eq!(ring.current(), Some(&b"third"[..]));
        assert_eq!(ring.rotate(), Some(&b"second"[..]));
        assert_eq!(ring.rotate(), Some(&b"first"[..]));
        assert_eq!(ring.rotate(), Some(&b"third"[..])); // 折り返し
    }

    #[test]
    fn save_resets_cursor_to_newest() {
        let mut ring = KillRing::new();
        ring.save(b"a", SaveMode::Replace);
        ring.save(b"b", SaveMode::Replace);
        ring.rotate();
        assert_eq!(ring.current(), Some(&b"a"[..]));

        ring.save(b"c", SaveMode::Replace);
        assert_eq!(ring.current(), Some(&b"c"[..]));
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut ring = KillRing::with_capacity(2);
        ring.save(b"one", SaveMode::Replace);
        ring.save(b"two", SaveMode::Replace);
        ring.save(b"three", SaveMode::Replace);
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.rotate(), Some(&b"two"[..]));
    }

    #[test]
    fn empty_spans_are_ignored() {
        let mut ring = KillRing::new();
        ring.save(b"", SaveMode::Replace);
        assert!(ring.is_empty());
    }
}
