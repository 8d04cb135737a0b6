//! 移動プリミティブ
//!
//! 文字・行・単語・段落単位の移動と行番号変換、括弧/引用符の対応検索。
//! バッファは不正なUTF-8を含み得るため、継続バイト判定で文字境界を決める。

use super::text::TextEngine;
use unicode_width::UnicodeWidthChar;

/// UTF-8継続バイトか
#[inline]
fn is_continuation(b: u8) -> bool {
    b & 0xC0 == 0x80
}

/// 単語構成バイトか（ASCII英数・アンダースコア・非ASCII）
#[inline]
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// 開き括弧に対応する閉じ括弧
fn closing_for(open: u8) -> Option<u8> {
    match open {
        b'(' => Some(b')'),
        b'[' => Some(b']'),
        b'{' => Some(b'}'),
        b'<' => Some(b'>'),
        _ => None,
    }
}

/// 閉じ括弧に対応する開き括弧
fn opening_for(close: u8) -> Option<u8> {
    match close {
        b')' => Some(b'('),
        b']' => Some(b'['),
        b'}' => Some(b'{'),
        b'>' => Some(b'<'),
        _ => None,
    }
}

/// 引用符か
fn is_quote(b: u8) -> bool {
    matches!(b, b'"' | b'\'' | b'`')
}

impl TextEngine {
    // ── 文字移動 ──────────────────────────────────

    /// 次の文字境界（終端では動かない）
    pub fn char_next(&self, pos: usize) -> usize {
        let bytes = self.contents();
        if pos >= bytes.len() {
            return pos;
        }
        let mut i = pos + 1;
        while i < bytes.len() && is_continuation(bytes[i]) {
            i += 1;
        }
        i
    }

    /// 前の文字境界（先頭では動かない）
    pub fn char_prev(&self, pos: usize) -> usize {
        let bytes = self.contents();
        if pos == 0 {
            return 0;
        }
        let mut i = pos.min(bytes.len()) - 1;
        while i > 0 && is_continuation(bytes[i]) {
            i -= 1;
        }
        i
    }

    // ── 行移動 ──────────────────────────────────

    /// 行頭（直前の改行の次。先頭行なら0）
    pub fn line_begin(&self, pos: usize) -> usize {
        let bytes = self.contents();
        let mut i = pos.min(bytes.len());
        while i > 0 && bytes[i - 1] != b'\n' {
            i -= 1;
        }
        i
    }

    /// 行末（改行の位置。最終行ならバッファ終端）
    pub fn line_end(&self, pos: usize) -> usize {
        let bytes = self.contents();
        let mut i = pos.min(bytes.len());
        while i < bytes.len() && bytes[i] != b'\n' {
            i += 1;
        }
        i
    }

    /// 1行下の行頭（最終行なら同じ位置を返し、境界を知らせる）
    pub fn line_down(&self, pos: usize) -> usize {
        let end = self.line_end(pos);
        if end < self.size() {
            end + 1
        } else {
            pos
        }
    }

    /// 1行上の行頭（先頭行なら同じ位置を返す）
    pub fn line_up(&self, pos: usize) -> usize {
        let begin = self.line_begin(pos);
        if begin == 0 {
            pos
        } else {
            self.line_begin(begin - 1)
        }
    }

    /// 位置から1始まりの行番号
    pub fn lineno_by_pos(&self, pos: usize) -> usize {
        let pos = pos.min(self.size());
        1 + self.contents()[..pos].iter().filter(|&&b| b == b'\n').count()
    }

    /// 1始まりの行番号から行頭位置（行が存在しなければ `None`）
    pub fn pos_by_lineno(&self, lineno: usize) -> Option<usize> {
        if lineno == 0 {
            return None;
        }
        if lineno == 1 {
            return Some(0);
        }
        let bytes = self.contents();
        let mut current = 1;
        for (i, &b) in bytes.iter().enumerate() {
            if b == b'\n' {
                current += 1;
                if current == lineno {
                    return Some(i + 1);
                }
            }
        }
        None
    }

    /// 行頭から指定表示カラムへ進んだ位置（行末でクランプ）
    pub fn line_offset(&self, pos: usize, target_column: usize, tab_width: usize) -> usize {
        let bytes = self.contents();
        let mut i = self.line_begin(pos);
        let mut col = 0;
        while i < bytes.len() && bytes[i] != b'\n' && col < target_column {
            let (width, len) = self.glyph_width_at(i, col, tab_width);
            col += width;
            i += len;
        }
        i
    }

    /// 位置の表示カラム（タブ展開済み）
    pub fn column_at(&self, pos: usize, tab_width: usize) -> usize {
        let bytes = self.contents();
        let pos = pos.min(bytes.len());
        let mut i = self.line_begin(pos);
        let mut col = 0;
        while i < pos {
            let (width, len) = self.glyph_width_at(i, col, tab_width);
            col += width;
            i += len;
        }
        col
    }

    /// 位置 `i` のグリフの (表示幅, バイト長)
    ///
    /// タブはタブストップまで、制御バイトはキャレット表記2桁、
    /// 不正バイトは16進ペア2桁として数える（描画と同じ規則）。
    fn glyph_width_at(&self, i: usize, col: usize, tab_width: usize) -> (usize, usize) {
        let bytes = self.contents();
        let b = bytes[i];
        if b == b'\t' {
            let tab = tab_width.max(1);
            (tab - col % tab, 1)
        } else if b < 0x20 || b == 0x7F {
            (2, 1)
        } else if b < 0x80 {
            (1, 1)
        } else {
            match decode_utf8(&bytes[i..]) {
                Some((ch, len)) => (ch.width().unwrap_or(1), len),
                None => (2, 1),
            }
        }
    }

    // ── 単語移動 ──────────────────────────────────

    /// 次の単語の終端
    pub fn word_end_next(&self, pos: usize) -> usize {
        let bytes = self.contents();
        let mut i = pos.min(bytes.len());
        while i < bytes.len() && !is_word_byte(bytes[i]) {
            i = self.char_next(i);
        }
        while i < bytes.len() && is_word_byte(bytes[i]) {
            i = self.char_next(i);
        }
        i
    }

    /// 前の単語の先頭
    pub fn word_begin_prev(&self, pos: usize) -> usize {
        let bytes = self.contents();
        let mut i = pos.min(bytes.len());
        while i > 0 {
            let p = self.char_prev(i);
            if is_word_byte(bytes[p]) {
                break;
            }
            i = p;
        }
        while i > 0 {
            let p = self.char_prev(i);
            if !is_word_byte(bytes[p]) {
                break;
            }
            i = p;
        }
        i
    }

    // ── 段落移動 ──────────────────────────────────

    /// 次の段落境界（段落末尾の改行直後、無ければ終端）
    pub fn paragraph_next(&self, pos: usize) -> usize {
        let bytes = self.contents();
        let mut i = pos.min(bytes.len());
        while i < bytes.len() && bytes[i] == b'\n' {
            i += 1;
        }
        while i < bytes.len() {
            if bytes[i] == b'\n' && (i + 1 == bytes.len() || bytes[i + 1] == b'\n') {
                return i + 1;
            }
            i += 1;
        }
        i
    }

    /// 前の段落の先頭（空行の直後、無ければ先頭）
    pub fn paragraph_prev(&self, pos: usize) -> usize {
        let bytes = self.contents();
        let mut i = pos.min(bytes.len());
        while i > 0 && bytes[i - 1] == b'\n' {
            i -= 1;
        }
        while i > 0 {
            if bytes[i - 1] == b'\n' && i >= 2 && bytes[i - 2] == b'\n' {
                break;
            }
            i -= 1;
        }
        i
    }

    // ── 括弧・引用符の対応 ──────────────────────────

    /// 開きデリミタの対応を `[pos, win_end)` 内で前方検索
    pub fn match_forward(&self, pos: usize, win_end: usize) -> Option<usize> {
        let bytes = self.contents();
        let win_end = win_end.min(bytes.len());
        let b = *bytes.get(pos)?;

        if let Some(close) = closing_for(b) {
            let mut depth = 0usize;
            let mut i = pos + 1;
            while i < win_end {
                if bytes[i] == b {
                    depth += 1;
                } else if bytes[i] == close {
                    if depth == 0 {
                        return Some(i);
                    }
                    depth -= 1;
                }
                i += 1;
            }
            None
        } else if is_quote(b) {
            bytes[pos + 1..win_end]
                .iter()
                .position(|&c| c == b)
                .map(|off| pos + 1 + off)
        } else {
            None
        }
    }

    /// 閉じデリミタの対応を `[win_start, pos]` 内で後方検索
    pub fn match_backward(&self, pos: usize, win_start: usize) -> Option<usize> {
        let bytes = self.contents();
        let b = *bytes.get(pos)?;

        if let Some(open) = opening_for(b) {
            let mut depth = 0usize;
            let mut i = pos;
            while i > win_start {
                i -= 1;
                if bytes[i] == b {
                    depth += 1;
                } else if bytes[i] == open {
                    if depth == 0 {
                        return Some(i);
                    }
                    depth -= 1;
                }
            }
            None
        } else if is_quote(b) {
            bytes[win_start..pos]
                .iter()
                .rposition(|&c| c == b)
                .map(|off| win_start + off)
        } else {
            None
        }
    }
}

/// 先頭の1コードポイントをデコード（不正なら `None`）
pub fn decode_utf8(bytes: &[u8]) -> Option<(char, usize)> {
    let first = *bytes.first()?;
    let len = match first {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return None,
    };
    if bytes.len() < len {
        return None;
    }
    std::str::from_utf8(&bytes[..len])
        .ok()
        .and_then(|s| s.chars().next())
        .map(|ch| (ch, len))
}
