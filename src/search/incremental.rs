//! インクリメンタル検索
//!
//! 1文字入力するたびに検索をやり直す状態機械。検索語・方向・アンカーを
//! 保持し、失敗時は1回だけ折り返して再試行する。ポイント移動は
//! ドキュメントへ直接反映し、マッチ範囲をハイライト用に設定する。

use crate::editor::Document;

/// 検索方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// `from` 以降で最初に現れる `needle` の開始位置
pub fn find_forward(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&s| &haystack[s..s + needle.len()] == needle)
}

/// `until` より手前で最後に現れる `needle` の開始位置
pub fn find_backward(haystack: &[u8], needle: &[u8], until: usize) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    let last = haystack.len() - needle.len();
    (0..=last.min(until.saturating_sub(1)))
        .rev()
        .find(|&s| s < until && &haystack[s..s + needle.len()] == needle)
}

/// インクリメンタル検索の進行状態
#[derive(Debug)]
pub struct IncrementalSearch {
    term: Vec<u8>,
    direction: Direction,
    /// 検索開始時のポイント。中断・確定時のマーク位置になる。
    origin: usize,
    /// 次の検索を始める位置
    anchor: usize,
    last_match: Option<(usize, usize)>,
    failed: bool,
}

impl IncrementalSearch {
    pub fn new(doc: &Document, direction: Direction) -> Self {
        let point = doc.point();
        Self {
            term: Vec::new(),
            direction,
            origin: point,
            anchor: point,
            failed: false,
            last_match: None,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn term_is_empty(&self) -> bool {
        self.term.is_empty()
    }

    /// ミニバッファ行に出すプロンプト
    pub fn prompt(&self) -> String {
        let failing = if self.failed { "Failing " } else { "" };
        let dir = match self.direction {
            Direction::Forward => "I-search",
            Direction::Backward => "I-search backward",
        };
        format!(
            "{}{}: {}",
            failing,
            dir,
            String::from_utf8_lossy(&self.term)
        )
    }

    /// 検索語に1文字追加して再検索する。`true` なら警告音を鳴らす。
    pub fn push_char(&mut self, doc: &mut Document, ch: char) -> bool {
        let mut utf8 = [0u8; 4];
        self.term.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
        if self.search(doc) {
            self.failed = false;
            return false;
        }
        if self.failed {
            // 2回目の失敗で折り返して再試行。それでも駄目なら黙る。
            self.wrap_anchor(doc);
            self.failed = false;
            self.search(doc);
            return false;
        }
        self.failed = true;
        true
    }

    /// 同方向の再検索。現在のマッチを越えた所から探し、失敗したら
    /// すぐ折り返して1回だけやり直す。`true` なら警告音。
    pub fn repeat(&mut self, doc: &mut Document, direction: Direction) -> bool {
        if self.term.is_empty() {
            return true;
        }
        if direction != self.direction {
            self.reverse(doc);
            return false;
        }
        if let Some((start, _end)) = self.last_match {
            // 後方は開始位置そのもの（find_backwardの排他境界が現マッチを飛ばす）
            self.anchor = match self.direction {
                Direction::Forward => start + 1,
                Direction::Backward => start,
            };
        }
        if self.search(doc) {
            self.failed = false;
            return false;
        }
        self.wrap_anchor(doc);
        if self.search(doc) {
            self.failed = false;
            return false;
        }
        self.failed = true;
        true
    }

    /// 方向を反転し、現在のマッチを反対側から見つけ直す
    /// （ポイントがマッチの逆端へ移る）
    fn reverse(&mut self, doc: &mut Document) {
        self.direction = match self.direction {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        };
        if let Some((start, end)) = self.last_match {
            self.anchor = match self.direction {
                Direction::Forward => start,
                Direction::Backward => end,
            };
        }
        self.failed = false;
        self.search(doc);
    }

    /// 検索語の末尾1文字を削り、開始位置から検索し直す
    pub fn erase(&mut self, doc: &mut Document) {
        // UTF-8の継続バイトをまとめて削る
        while let Some(b) = self.term.pop() {
            if b & 0xc0 != 0x80 {
                break;
            }
        }
        self.failed = false;
        self.anchor = self.origin;
        self.last_match = None;
        if self.term.is_empty() {
            doc.match_range = None;
            doc.set_point(self.origin);
            doc.update_target_column();
        } else {
            self.search(doc);
        }
    }

    /// 検索語を空にして開始位置へ戻る
    pub fn clear(&mut self, doc: &mut Document) {
        self.term.clear();
        self.failed = false;
        self.anchor = self.origin;
        self.last_match = None;
        doc.match_range = None;
        doc.set_point(self.origin);
        doc.update_target_column();
    }

    /// 中断。ポイントを開始位置へ戻す。
    pub fn cancel(&mut self, doc: &mut Document) {
        doc.match_range = None;
        doc.set_point(self.origin);
        doc.update_target_column();
    }

    /// 確定。マークを開始位置に置き、ハイライトを消す。
    pub fn commit(&mut self, doc: &mut Document) {
        if self.term.is_empty() {
            doc.set_point(self.origin);
        }
        doc.set_mark(self.origin);
        doc.match_range = None;
        doc.update_target_column();
    }

    fn wrap_anchor(&mut self, doc: &Document) {
        self.anchor = match self.direction {
            Direction::Forward => 0,
            Direction::Backward => doc.engine().size(),
        };
    }

    /// アンカーから検索し、見つかればポイントとハイライトを動かす
    fn search(&mut self, doc: &mut Document) -> bool {
        if self.term.is_empty() {
            doc.match_range = None;
            return true;
        }
        let found = match self.direction {
            Direction::Forward => find_forward(doc.engine().contents(), &self.term, self.anchor),
            Direction::Backward => find_backward(doc.engine().contents(), &self.term, self.anchor),
        };
        match found {
            Some(start) => {
                let end = start + self.term.len();
                self.last_match = Some((start, end));
                doc.match_range = Some((start, end));
                let point = match self.direction {
                    Direction::Forward => end,
                    Direction::Backward => start,
                };
                doc.set_point(point);
                doc.update_target_column();
                true
            }
            None => false,
        }
    }
}
