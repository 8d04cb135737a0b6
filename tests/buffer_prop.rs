//! バッファエンジンのプロパティテスト

use proptest::prelude::*;
use temacs::buffer::TextEngine;

proptest! {
    /// 挿入してundoすれば元のバイト列へ戻る
    #[test]
    fn insert_then_restore_round_trips(
        initial in proptest::collection::vec(any::<u8>(), 0..64),
        inserted in proptest::collection::vec(any::<u8>(), 1..16),
        at_ratio in 0.0f64..1.0,
    ) {
        let mut engine = TextEngine::from_bytes(initial.clone());
        let at = (initial.len() as f64 * at_ratio) as usize;
        engine.snapshot();
        engine.insert(at, &inserted).unwrap();
        prop_assert_eq!(engine.size(), initial.len() + inserted.len());
        engine.restore(1).unwrap();
        prop_assert_eq!(engine.contents(), &initial[..]);
    }

    /// 編集列を重ねてもマークはバッファサイズを超えない
    #[test]
    fn marks_stay_in_bounds(
        initial in proptest::collection::vec(any::<u8>(), 0..64),
        edits in proptest::collection::vec(
            (any::<bool>(), 0.0f64..1.0, proptest::collection::vec(any::<u8>(), 1..8)),
            1..16,
        ),
    ) {
        let mut engine = TextEngine::from_bytes(initial);
        let mark = engine.mark_set(engine.size() / 2);
        for (is_insert, ratio, data) in edits {
            let size = engine.size();
            let at = (size as f64 * ratio) as usize;
            if is_insert {
                engine.insert(at.min(size), &data).unwrap();
            } else if size > 0 {
                let at = at.min(size - 1);
                let len = data.len().min(size - at);
                engine.delete(at, len).unwrap();
            }
            prop_assert!(engine.mark_get(mark) <= engine.size());
        }
    }

    /// 削除後に範囲内マークは削除開始位置へ寄せられる
    #[test]
    fn delete_clamps_interior_marks(
        len in 8usize..64,
        start_ratio in 0.0f64..0.9,
    ) {
        let bytes = vec![b'x'; len];
        let mut engine = TextEngine::from_bytes(bytes);
        let start = (len as f64 * start_ratio) as usize;
        let del_len = (len - start).min(4);
        let inner = engine.mark_set((start + del_len / 2).min(len));
        engine.delete(start, del_len).unwrap();
        let resolved = engine.mark_get(inner);
        if del_len >= 2 {
            // 削除範囲の内側にいたマークは削除開始位置へ寄る
            prop_assert_eq!(resolved, start);
        } else {
            prop_assert!(resolved <= engine.size());
        }
    }

    /// 改行を含む任意のテキストで行番号と位置の変換が往復する
    #[test]
    fn lineno_pos_round_trip(text in "[a-z\n]{0,64}") {
        let engine = TextEngine::from_str(&text);
        let lines = text.split('\n').count();
        for lineno in 1..=lines {
            if let Some(pos) = engine.pos_by_lineno(lineno) {
                prop_assert_eq!(engine.lineno_by_pos(pos), lineno);
            }
        }
    }
}
