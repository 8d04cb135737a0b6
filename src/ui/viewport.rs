//! ビューポート描画
//!
//! バッファの可視範囲を文字グリッドへ描画する。描画開始位置（トップ）は
//! バッファ内のマークとして保持し、編集に追従させる。
//!
//! 描画規則:
//! - タブは次のタブストップまで空白展開
//! - 制御文字はキャレット記法（`^A` など）で太字表示
//! - UTF-8として不正なバイトは16進2桁の反転表示
//! - 行が画面幅を超えたら右端に `\` を置いて折り返す
//! - バッファ末尾が改行で終わらない場合は `◊` を表示
//! - 末尾以降の空行は `~` で埋める
//! - 下から2行目がステータス行、最下行がメッセージ行

use crate::buffer::{decode_utf8, Mark};
use crate::editor::Document;
use crate::error::{BufferError, Result};
use crate::ui::grid::{RenderedGrid, CONTINUATION};
use unicode_width::UnicodeWidthChar;

/// バッファ末尾を示すマーカー
const EOF_MARKER: char = '\u{25ca}'; // ◊

/// 1回の描画パスの結果
struct RenderPass {
    grid: RenderedGrid,
    /// 描画が消費した最終バッファオフセット（排他）
    end: usize,
    cursor_found: bool,
}

/// バッファの可視窓
#[derive(Debug)]
pub struct Viewport {
    top: Mark,
    rendered_end: usize,
    rows: usize,
    cols: usize,
    retry_limit: usize,
}

impl Viewport {
    /// ドキュメント先頭をトップとするビューポートを作る
    pub fn new(doc: &mut Document, rows: usize, cols: usize, retry_limit: usize) -> Self {
        let top = doc.engine_mut().mark_set(0);
        Self {
            top,
            rendered_end: 0,
            rows,
            cols,
            retry_limit: retry_limit.max(1),
        }
    }

    /// 端末サイズ変更に追従する
    pub fn set_dimensions(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// 現在のトップオフセット
    pub fn top(&self, doc: &Document) -> usize {
        doc.engine().mark_get(self.top)
    }

    /// 直近の描画が消費した終端オフセット
    pub fn rendered_end(&self) -> usize {
        self.rendered_end
    }

    /// トップを指定オフセットの行頭へ直接動かす
    pub fn jump_top(&mut self, doc: &mut Document, offset: usize) {
        let bol = doc.engine().line_begin(offset.min(doc.engine().size()));
        doc.engine_mut().mark_move(self.top, bol);
    }

    /// ポイント行が画面中央に来るようトップを置き直す
    pub fn recenter(&mut self, doc: &mut Document) {
        let point = doc.point();
        let lineno = doc.engine().lineno_by_pos(point) as isize;
        let half = (self.rows as isize - 2) / 2;
        let top_line = (lineno - half).max(1) as usize;
        let pos = doc.engine().pos_by_lineno(top_line).unwrap_or(0);
        doc.engine_mut().mark_move(self.top, pos);
    }

    /// トップを `off` 行ぶんずらす（正で下方向）
    ///
    /// 画面外に出たポイントは窓の端へ引き戻す。これ以上動けない場合は
    /// `AtStart` / `AtEnd` を返す。
    pub fn scroll(&mut self, doc: &mut Document, off: isize) -> Result<()> {
        let top = self.top(doc);
        let top_line = doc.engine().lineno_by_pos(top) as isize;
        if top_line == 1 && off < 0 {
            // 既に先頭行が見えている。ポイントだけ先頭へ。
            if doc.point() == 0 {
                return Err(BufferError::AtStart.into());
            }
            doc.set_point(0);
            doc.update_target_column();
            return Ok(());
        }
        let target = (top_line + off).max(1) as usize;
        let new_top = match doc.engine().pos_by_lineno(target) {
            Some(pos) => pos,
            None => {
                // 下端を越えた。トップは動かさずポイントを末尾へ。
                if doc.point() == doc.engine().size() {
                    return Err(BufferError::AtEnd.into());
                }
                doc.move_buffer_end();
                return Ok(());
            }
        };
        doc.engine_mut().mark_move(self.top, new_top);
        // 新しい窓の終端を知るために一度描画する
        let pass = self.render_pass(doc, "");
        self.rendered_end = pass.end;
        let point = doc.point();
        if off > 0 && point < new_top {
            doc.set_point(new_top);
            doc.update_target_column();
        } else if off < 0 && self.rendered_end < point {
            let bol = doc.engine().line_begin(self.rendered_end);
            doc.set_point(bol);
            doc.update_target_column();
        } else if doc.target_column > 0 {
            let pos =
                doc.engine()
                    .line_offset(point, doc.target_column, doc.tab_width());
            doc.set_point(pos);
        }
        Ok(())
    }

    /// 画面全体を描画する
    ///
    /// ポイントが窓の上にあればリセンタし、下にはみ出していればトップを
    /// 10行ずつ送って再描画する。送り直しは設定回数で打ち切る。
    pub fn render(&mut self, doc: &mut Document, message: &str) -> RenderedGrid {
        let mut attempts = 0;
        loop {
            let top = self.top(doc);
            let point = doc.point();
            if point < top {
                self.recenter(doc);
            } else if self.rows >= 3 {
                // 行数的に窓の外へ飛んだポイントは中央へ置き直す。
                // 以降の再試行は折り返しで行が余計に消費された分だけを補う。
                let top_line = doc.engine().lineno_by_pos(top);
                let point_line = doc.engine().lineno_by_pos(point);
                if point_line > top_line + self.rows - 3 {
                    self.recenter(doc);
                }
            }
            let pass = self.render_pass(doc, message);
            self.rendered_end = pass.end;
            attempts += 1;
            if pass.cursor_found || attempts >= self.retry_limit {
                return pass.grid;
            }
            let top = self.top(doc);
            let top_line = doc.engine().lineno_by_pos(top);
            match doc.engine().pos_by_lineno(top_line + 10) {
                Some(pos) => doc.engine_mut().mark_move(self.top, pos),
                None => return pass.grid,
            }
        }
    }

    /// トップ固定で1回だけ描画する
    fn render_pass(&self, doc: &Document, message: &str) -> RenderPass {
        let rows = self.rows;
        let cols = self.cols;
        let mut grid = RenderedGrid::new(rows, cols);
        if rows < 3 || cols < 2 {
            return RenderPass {
                grid,
                end: self.top(doc),
                cursor_found: true,
            };
        }

        let engine = doc.engine();
        let top = self.top(doc);
        let point = doc.point();
        let size = engine.size();
        let tab_width = doc.tab_width();
        let budget = rows * cols * 4;
        let buf = engine.bytes_in_range(top, budget);
        let win_end = top + buf.len();

        // ポイント位置の括弧・引用符の対応（窓内のみ）
        let pair = self.bracket_pair(doc, top, win_end);
        let highlight = |off: usize| -> bool {
            if let Some((open, close)) = pair {
                if off == open || off == close {
                    return true;
                }
            }
            if let Some((start, end)) = doc.match_range {
                if start <= off && off < end {
                    return true;
                }
            }
            false
        };

        let last_content_row = rows - 3;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut cursor: Option<(usize, usize)> = None;
        let mut i = 0usize;
        let mut truncated = false;

        while i < buf.len() {
            let off = top + i;
            if off == point && cursor.is_none() {
                cursor = Some((row, col));
            }
            let b = buf[i];
            if b == b'\n' {
                i += 1;
                if row == last_content_row {
                    truncated = true;
                    break;
                }
                row += 1;
                col = 0;
                continue;
            }
            let bold = highlight(off);
            if b == b'\t' {
                // 右端に収まらないタブは折り返してから展開する
                if col + 1 > cols - 1 {
                    if !self.wrap(&mut grid, &mut row, &mut col, last_content_row) {
                        truncated = true;
                        break;
                    }
                    if off == point {
                        cursor = Some((row, col));
                    }
                }
                let stop = ((col / tab_width) + 1) * tab_width;
                let width = (stop - col).min(cols - 1 - col);
                for _ in 0..width {
                    grid.put(row, col, ' ', false, false);
                    col += 1;
                }
                i += 1;
                continue;
            }
            // 1バイトまたは1コードポイントをセル列へ
            let (units, consumed) = classify(&buf[i..]);
            let total: usize = units.iter().map(|u| u.width).sum();
            if col + total > cols - 1 {
                if !self.wrap(&mut grid, &mut row, &mut col, last_content_row) {
                    truncated = true;
                    break;
                }
                if off == point {
                    // 折り返し境界のポイントは次行の先頭に置く
                    cursor = Some((row, col));
                }
            }
            for unit in &units {
                grid.put(row, col, unit.ch, unit.bold || bold, unit.reverse);
                col += 1;
                for _ in 1..unit.width {
                    grid.put(row, col, CONTINUATION, false, false);
                    col += 1;
                }
            }
            i += consumed;
        }

        let end = top + i;
        let at_eof = !truncated && win_end == size && i == buf.len();
        if at_eof {
            if point == size && cursor.is_none() {
                cursor = Some((row, col));
            }
            // 最終行が改行で終わらない場合だけ終端マーカーを出す
            let trailing_newline = size == 0 || engine.byte_at(size - 1) == Some(b'\n');
            if !trailing_newline {
                grid.put(row, col, EOF_MARKER, false, false);
            }
        }

        // 残り行の埋め草
        for filler in (row + 1)..=last_content_row {
            grid.put(filler, 0, '~', false, false);
        }

        self.draw_status(&mut grid, doc, rows - 2);
        grid.put_str(rows - 1, message, false);

        let cursor_found = cursor.is_some();
        grid.cursor = cursor.unwrap_or((0, 0));
        RenderPass {
            grid,
            end,
            cursor_found,
        }
    }

    /// 折り返しマーカーを置いて次行へ。画面下端なら false。
    fn wrap(&self, grid: &mut RenderedGrid, row: &mut usize, col: &mut usize, last: usize) -> bool {
        grid.put(*row, self.cols - 1, '\\', false, false);
        if *row == last {
            return false;
        }
        *row += 1;
        *col = 0;
        true
    }

    /// ポイント位置に対応する括弧ペア (開き, 閉じ) を探す
    fn bracket_pair(&self, doc: &Document, top: usize, win_end: usize) -> Option<(usize, usize)> {
        let engine = doc.engine();
        let point = doc.point();
        if point > top {
            let prev = engine.char_prev(point);
            if prev >= top {
                if let Some(open) = engine.match_backward(prev, top) {
                    return Some((open, prev));
                }
            }
        }
        if point < win_end {
            if let Some(close) = engine.match_forward(point, win_end) {
                return Some((point, close));
            }
        }
        None
    }

    fn draw_status(&self, grid: &mut RenderedGrid, doc: &Document, row: usize) {
        let engine = doc.engine();
        let point = doc.point();
        let lineno = engine.lineno_by_pos(point);
        let column = point - engine.line_begin(point) + 1;
        let status = format!(
            "--{}- {} -- L{} C{} B{}/{}",
            if doc.modified() { "**" } else { "--" },
            doc.display_name,
            lineno,
            column,
            point,
            engine.size(),
        );
        grid.put_str(row, &status, true);
        grid.set_row_reverse(row);
    }
}

/// 描画単位のセル
struct Unit {
    ch: char,
    width: usize,
    bold: bool,
    reverse: bool,
}

/// バッファ先頭のバイト列を描画単位へ分類する
///
/// 戻り値は (セル列, 消費バイト数)。
fn classify(bytes: &[u8]) -> (Vec<Unit>, usize) {
    let b = bytes[0];
    if b < 0x20 || b == 0x7f {
        // 制御文字はキャレット記法
        let shown = (b ^ 0x40) as char;
        return (
            vec![
                Unit {
                    ch: '^',
                    width: 1,
                    bold: true,
                    reverse: false,
                },
                Unit {
                    ch: shown,
                    width: 1,
                    bold: true,
                    reverse: false,
                },
            ],
            1,
        );
    }
    if b < 0x80 {
        return (
            vec![Unit {
                ch: b as char,
                width: 1,
                bold: false,
                reverse: false,
            }],
            1,
        );
    }
    if let Some((ch, len)) = decode_utf8(bytes) {
        let width = ch.width().unwrap_or(1).max(1);
        return (
            vec![Unit {
                ch,
                width,
                bold: false,
                reverse: false,
            }],
            len,
        );
    }
    // 不正バイトは16進で反転表示
    let digits = format!("{:02x}", b);
    let mut chars = digits.chars();
    let hi = chars.next().unwrap_or('0');
    let lo = chars.next().unwrap_or('0');
    (
        vec![
            Unit {
                ch: hi,
                width: 1,
                bold: false,
                reverse: true,
            },
            Unit {
                ch: lo,
                width: 1,
                bold: false,
                reverse: true,
            },
        ],
        1,
    )
}
