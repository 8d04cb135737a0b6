//! 編集操作エンジン
//!
//! ドキュメントとキルリングに対するステートレスな編集操作群。
//! 各操作は実行前に直前アクションタグと照合し、同種連続の編集だけを
//! 1つのundoステップへ合流させる。境界条件は状態を変えずに `Err` を返す。

use super::document::{ActionTag, Document};
use super::kill_ring::{KillRing, SaveMode};
use crate::error::{BufferError, Result, TemacsError};

/// 変更系コマンドの前処理
///
/// 合流可能な同種連続ならスナップショットを開き直さない。
fn begin_edit(doc: &mut Document, tag: ActionTag) {
    if !(tag.coalesces() && doc.last_action == tag) {
        doc.record_undo();
    }
    doc.last_action = tag;
}

/// 連続キル判定（`begin_edit` より前に呼ぶこと）
fn kill_mode(doc: &Document, tag: ActionTag, coalesced: SaveMode) -> SaveMode {
    if doc.last_action == tag {
        coalesced
    } else {
        SaveMode::Replace
    }
}

/// 1文字挿入。ポイントを進め、目標カラムを更新する。
pub fn insert_char(doc: &mut Document, ch: char) -> Result<()> {
    begin_edit(doc, ActionTag::Insert);

    let mut encoded = [0u8; 4];
    let bytes = ch.encode_utf8(&mut encoded).as_bytes().to_vec();
    let point = doc.point();
    doc.engine_mut().insert(point, &bytes)?;
    doc.set_point(point + bytes.len());
    doc.update_target_column();
    Ok(())
}

/// 改行挿入
pub fn newline(doc: &mut Document) -> Result<()> {
    insert_char(doc, '\n')
}

/// ASCIIバイトをそのまま挿入（quoted-insert）
pub fn quoted_insert(doc: &mut Document, byte: u8) -> Result<()> {
    begin_edit(doc, ActionTag::Insert);

    let point = doc.point();
    doc.engine_mut().insert(point, &[byte])?;
    doc.set_point(point + 1);
    doc.update_target_column();
    Ok(())
}

/// ポイント直前の1文字を削除
pub fn backspace(doc: &mut Document) -> Result<()> {
    let point = doc.point();
    let prev = doc.engine().char_prev(point);
    if prev == point {
        return Err(TemacsError::Buffer(BufferError::AtStart));
    }

    begin_edit(doc, ActionTag::Backspace);
    doc.engine_mut().delete(prev, point - prev)?;
    doc.set_point(prev);
    doc.update_target_column();
    Ok(())
}

/// ポイント直後の1文字を削除
pub fn delete_forward(doc: &mut Document) -> Result<()> {
    let point = doc.point();
    let next = doc.engine().char_next(point);
    if next == point {
        return Err(TemacsError::Buffer(BufferError::AtEnd));
    }

    begin_edit(doc, ActionTag::Other);
    doc.engine_mut().delete(point, next - point)?;
    Ok(())
}

/// ポイント前後の文字を入れ替える
///
/// 改行直前では前の行の最終文字側で入れ替え、行を跨いだ見た目にしない。
pub fn transpose_chars(doc: &mut Document) -> Result<()> {
    let mut pos = doc.point();
    let at_newline = match doc.engine().byte_at(pos) {
        Some(b'\n') | None => true,
        Some(_) => false,
    };
    if at_newline {
        pos = doc.engine().char_prev(pos);
    }

    let prev = doc.engine().char_prev(pos);
    let next = doc.engine().char_next(pos);
    if prev == pos || next == pos {
        return Err(TemacsError::Buffer(BufferError::AtStart));
    }

    begin_edit(doc, ActionTag::Other);

    let prev_glyph = doc.engine().copy_range(prev, pos);
    let next_glyph = doc.engine().copy_range(pos, next);
    doc.engine_mut().delete(prev, next - prev)?;
    doc.engine_mut().insert(prev, &next_glyph)?;
    doc.engine_mut().insert(prev + next_glyph.len(), &prev_glyph)?;

    let mut point = prev + next_glyph.len();
    if doc.engine().byte_at(point) == Some(b'\n') {
        point = doc.engine().char_next(point);
    }
    doc.set_point(point);
    doc.update_target_column();
    Ok(())
}

/// 行末までキル
///
/// 行頭または行末（空の残り）では改行ごと行全体をキルする。
pub fn kill_eol(doc: &mut Document, ring: &mut KillRing) -> Result<()> {
    let point = doc.point();
    let bol = doc.engine().line_begin(point);
    let mut eol = doc.engine().line_end(point);
    if point == bol || point == eol {
        eol = doc.engine().line_down(point);
    }
    if eol <= point {
        return Err(TemacsError::Buffer(BufferError::AtEnd));
    }

    let mode = kill_mode(doc, ActionTag::KillToEol, SaveMode::Append);
    begin_edit(doc, ActionTag::KillToEol);

    let span = doc.engine().copy_range(point, eol);
    ring.save(&span, mode);
    doc.engine_mut().delete(point, eol - point)?;
    doc.update_target_column();
    Ok(())
}

/// 次の単語の終端までキル
pub fn kill_word(doc: &mut Document, ring: &mut KillRing) -> Result<()> {
    let point = doc.point();
    let end = doc.engine().word_end_next(point);
    if end == point {
        return Err(TemacsError::Buffer(BufferError::AtEnd));
    }

    let mode = kill_mode(doc, ActionTag::KillWord, SaveMode::Append);
    begin_edit(doc, ActionTag::KillWord);

    let span = doc.engine().copy_range(point, end);
    ring.save(&span, mode);
    doc.engine_mut().delete(point, end - point)?;
    doc.update_target_column();
    Ok(())
}

/// 前の単語の先頭までキル
pub fn backward_kill_word(doc: &mut Document, ring: &mut KillRing) -> Result<()> {
    let point = doc.point();
    let start = doc.engine().word_begin_prev(point);
    if start == point {
        return Err(TemacsError::Buffer(BufferError::AtStart));
    }

    let mode = kill_mode(doc, ActionTag::BackwardKillWord, SaveMode::Prepend);
    begin_edit(doc, ActionTag::BackwardKillWord);

    let span = doc.engine().copy_range(start, point);
    ring.save(&span, mode);
    doc.engine_mut().delete(start, point - start)?;
    doc.update_target_column();
    Ok(())
}

/// リージョン（ポイントとマークの間）をキル
pub fn kill_region(doc: &mut Document, ring: &mut KillRing) -> Result<()> {
    let (lo, hi) = doc.region();
    ring.save(&doc.engine().copy_range(lo, hi), SaveMode::Replace);
    if lo == hi {
        return Ok(());
    }

    begin_edit(doc, ActionTag::Other);
    doc.engine_mut().delete_range(lo, hi)?;
    doc.set_point(lo);
    doc.set_mark(lo);
    doc.update_target_column();
    Ok(())
}

/// リージョンをキルリングへ保存（バッファは変更しない）
pub fn kill_region_save(doc: &mut Document, ring: &mut KillRing) {
    let (lo, hi) = doc.region();
    ring.save(&doc.engine().copy_range(lo, hi), SaveMode::Replace);
    doc.last_action = ActionTag::Other;
}

/// キルリングの最新エントリをポイントへ挿入
///
/// 挿入前の位置をマークに、挿入末尾をポイントにする。
pub fn yank(doc: &mut Document, ring: &mut KillRing) -> Result<()> {
    let text = match ring.newest() {
        Some(text) => text.to_vec(),
        None => {
            return Err(TemacsError::Application("Kill ring is empty".to_string()));
        }
    };
    ring.reset_cursor();

    begin_edit(doc, ActionTag::Yank);

    let point = doc.point();
    doc.engine_mut().insert(point, &text)?;
    doc.set_mark(point);
    doc.set_point(point + text.len());
    doc.update_target_column();
    Ok(())
}

/// 直前のyankを1つ古いエントリで置き換える
///
/// 直前コマンドがyankでなければ状態を変えずに失敗する。
pub fn yank_pop(doc: &mut Document, ring: &mut KillRing) -> Result<()> {
    if doc.last_action != ActionTag::Yank {
        return Err(TemacsError::Application(
            "Previous command was not a yank".to_string(),
        ));
    }
    let text = match ring.rotate() {
        Some(text) => text.to_vec(),
        None => {
            return Err(TemacsError::Application("Kill ring is empty".to_string()));
        }
    };

    begin_edit(doc, ActionTag::Yank);

    let (lo, hi) = doc.region();
    doc.engine_mut().delete_range(lo, hi)?;
    doc.engine_mut().insert(lo, &text)?;
    doc.set_mark(lo);
    doc.set_point(lo + text.len());
    doc.update_target_column();
    Ok(())
}

/// 1チェックポイント分のundo
///
/// 連続undoはそのまま更に古い状態へ歩く。
pub fn undo(doc: &mut Document) -> Result<()> {
    doc.undo()?;
    doc.last_action = ActionTag::Undo;
    Ok(())
}

/// 次の単語を先頭大文字・残り小文字にし、単語の終端へ進む
pub fn capitalize_word(doc: &mut Document) -> Result<()> {
    let point = doc.point();
    let end = doc.engine().word_end_next(point);
    if end == point {
        return Err(TemacsError::Buffer(BufferError::AtEnd));
    }
    let start = doc.engine().word_begin_prev(end).max(point);

    begin_edit(doc, ActionTag::Other);

    let span = doc.engine().copy_range(start, end);
    let replacement = capitalize_span(&span);
    doc.engine_mut().delete(start, end - start)?;
    doc.engine_mut().insert(start, &replacement)?;
    doc.set_point(start + replacement.len());
    doc.update_target_column();
    Ok(())
}

/// 次のタブストップまでスペースでインデント（magic tab）
pub fn indent_magic(doc: &mut Document) -> Result<()> {
    let tab = doc.tab_width();
    let point = doc.point();
    let column = doc.engine().column_at(point, tab);
    let fill = tab - column % tab;

    begin_edit(doc, ActionTag::Other);
    doc.engine_mut().insert(point, &vec![b' '; fill])?;
    doc.set_point(point + fill);
    doc.update_target_column();
    Ok(())
}

fn capitalize_span(span: &[u8]) -> Vec<u8> {
    match std::str::from_utf8(span) {
        Ok(s) => {
            let mut out = String::with_capacity(s.len());
            let mut chars = s.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
            }
            for ch in chars {
                out.extend(ch.to_lowercase());
            }
            out.into_bytes()
        }
        // 不正UTF-8はASCIIの範囲だけ変換する
        Err(_) => {
            let mut out = span.to_vec();
            if let Some(first) = out.first_mut() {
                *first = first.to_ascii_uppercase();
            }
            for b in out.iter_mut().skip(1) {
                *b = b.to_ascii_lowercase();
            }
            out
        }
    }
}
