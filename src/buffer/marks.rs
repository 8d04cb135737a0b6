//! マーク管理
//!
//! バッファ内の位置を編集を跨いで追跡する不透明ハンドル。
//! 全ての編集操作がアリーナ内の生きたオフセットをシフト/クランプ規則で更新する。

/// バッファ内位置への不透明ハンドル
///
/// `TextEngine` が発行し、同じエンジンに対してのみ解決できる。
/// 解放済みマークの解決はプログラミングエラーとして扱う（panic）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(pub(crate) usize);

/// マークのアリーナ
///
/// スロットには生きたバイトオフセットを保持する。
/// 解放されたスロットは `None` になり再利用されない。
#[derive(Debug, Default)]
pub struct MarkArena {
    slots: Vec<Option<usize>>,
}

impl MarkArena {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// 指定オフセットに新しいマークを作成
    pub fn create(&mut self, offset: usize) -> Mark {
        self.slots.push(Some(offset));
        Mark(self.slots.len() - 1)
    }

    /// マークを解決してバイトオフセットを得る
    pub fn resolve(&self, mark: Mark) -> usize {
        self.slots
            .get(mark.0)
            .copied()
            .flatten()
            .unwrap_or_else(|| panic!("resolved a released mark {:?}", mark))
    }

    /// マークを別のオフセットへ移動
    pub fn move_to(&mut self, mark: Mark, offset: usize) {
        match self.slots.get_mut(mark.0) {
            Some(slot @ Some(_)) => *slot = Some(offset),
            _ => panic!("moved a released mark {:?}", mark),
        }
    }

    /// マークを明示的に複製（同じオフセットを指す独立したマーク）
    pub fn duplicate(&mut self, mark: Mark) -> Mark {
        let offset = self.resolve(mark);
        self.create(offset)
    }

    /// マークを解放
    pub fn release(&mut self, mark: Mark) {
        if let Some(slot) = self.slots.get_mut(mark.0) {
            *slot = None;
        }
    }

    /// 挿入に伴うシフト
    ///
    /// 挿入点より後ろ（厳密に大きいオフセット）のマークを `len` 進める。
    /// 挿入点ちょうどのマークは動かない（カーソル前進は呼び出し側が明示する）。
    pub fn shift_for_insert(&mut self, at: usize, len: usize) {
        for slot in self.slots.iter_mut().flatten() {
            if *slot > at {
                *slot += len;
            }
        }
    }

    /// 削除に伴うシフト/クランプ
    ///
    /// 削除範囲内のマークは範囲先頭へクランプし、
    /// 範囲より後ろのマークは `len` 戻す。
    pub fn shift_for_delete(&mut self, at: usize, len: usize) {
        let end = at + len;
        for slot in self.slots.iter_mut().flatten() {
            if *slot > end {
                *slot -= len;
            } else if *slot > at {
                *slot = at;
            }
        }
    }

    /// バッファサイズ変更後のクランプ（undo復元用）
    pub fn clamp_to(&mut self, size: usize) {
        for slot in self.slots.iter_mut().flatten() {
            if *slot > size {
                *slot = size;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_shifts_marks_after_point() {
        let mut arena = MarkArena::new();
        let before = arena.create(2);
        let at = arena.create(5);
        let after = arena.create(8);

        arena.shift_for_insert(5, 3);

        assert_eq!(arena.resolve(before), 2);
        assert_eq!(arena.resolve(at), 5);
        assert_eq!(arena.resolve(after), 11);
    }

    #[test]
    fn delete_clamps_marks_inside_range() {
        let mut arena = MarkArena::new();
        let before = arena.create(1);
        let inside = arena.create(6);
        let after = arena.create(12);

        arena.shift_for_delete(4, 4);

        assert_eq!(arena.resolve(before), 1);
        assert_eq!(arena.resolve(inside), 4);
        assert_eq!(arena.resolve(after), 8);
    }

    #[test]
    fn duplicated_marks_move_independently() {
        let mut arena = MarkArena::new();
        let a = arena.create(3);
        let b = arena.duplicate(a);

        arena.move_to(b, 7);

        assert_eq!(arena.resolve(a), 3);
        assert_eq!(arena.resolve(b), 7);
    }

    #[test]
    #[should_panic(expected = "released mark")]
    fn resolving_released_mark_panics() {
        let mut arena = MarkArena::new();
        let mark = arena.create(0);
        arena.release(mark);
        arena.resolve(mark);
    }
}
