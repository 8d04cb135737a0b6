//! 描画グリッド
//!
//! 端末1画面分の文字グリッド。セルごとに太字/反転属性を持つ。
//! フロントエンドはこのグリッドをそのまま端末へ写す。

/// グリッドの1セル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub bold: bool,
    pub reverse: bool,
}

/// 全角文字の右半分を示す継続セル（描画時にスキップされる）
pub const CONTINUATION: char = '\0';

impl Cell {
    pub fn blank() -> Self {
        Self {
            ch: ' ',
            bold: false,
            reverse: false,
        }
    }

    pub fn is_continuation(&self) -> bool {
        self.ch == CONTINUATION
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank()
    }
}

/// 描画済みグリッド
///
/// `cursor` は端末カーソルを置くべき (row, col)。
#[derive(Debug, Clone)]
pub struct RenderedGrid {
    pub rows: usize,
    pub cols: usize,
    cells: Vec<Cell>,
    pub cursor: (usize, usize),
}

impl RenderedGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::blank(); rows * cols],
            cursor: (0, 0),
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.cells[row * self.cols + col]
    }

    /// セルを書き込む（範囲外は無視）
    pub fn put(&mut self, row: usize, col: usize, ch: char, bold: bool, reverse: bool) {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col] = Cell { ch, bold, reverse };
        }
    }

    /// 文字列を1行に書き込む（行幅でクリップ）
    pub fn put_str(&mut self, row: usize, text: &str, reverse: bool) {
        for (col, ch) in text.chars().enumerate() {
            if col >= self.cols {
                break;
            }
            self.put(row, col, ch, false, reverse);
        }
    }

    /// 1行全体に属性を適用
    pub fn set_row_reverse(&mut self, row: usize) {
        if row >= self.rows {
            return;
        }
        for col in 0..self.cols {
            self.cells[row * self.cols + col].reverse = true;
        }
    }

    /// 行の内容を文字列として取り出す（テスト用、末尾空白は落とす）
    pub fn row_text(&self, row: usize) -> String {
        let mut text: String = (0..self.cols)
            .map(|col| {
                let cell = self.cell(row, col);
                if cell.is_continuation() {
                    ' '
                } else {
                    cell.ch
                }
            })
            .collect();
        let trimmed = text.trim_end().len();
        text.truncate(trimmed);
        text
    }
}
