//! 正規表現によるバッファ全体検索
//!
//! バイト列のまま検索するため `regex::bytes` を使う。ポイント位置から
//! 前方を探し、見つからなければ先頭へ1回だけ折り返す。

use crate::editor::Document;
use crate::error::{Result, SearchError};
use regex::bytes::Regex;

/// パターンをコンパイルする。不正なら診断メッセージ付きで失敗。
pub fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        SearchError::InvalidPattern {
            message: e.to_string(),
        }
        .into()
    })
}

/// ポイントの次のマッチへ移動する
///
/// ポイントはマッチ終端へ置くので、繰り返し呼べば順に次のマッチへ進む。
pub fn search_pattern(doc: &mut Document, pattern: &str) -> Result<()> {
    let re = compile(pattern)?;
    let haystack = doc.engine().contents();
    let point = doc.point();
    let found = re
        .find_at(haystack, point)
        .or_else(|| re.find(haystack))
        .map(|m| (m.start(), m.end()));
    let (start, end) = found.ok_or_else(|| SearchError::NotFound {
        pattern: pattern.to_string(),
    })?;
    doc.match_range = Some((start, end));
    doc.set_point(end);
    doc.update_target_column();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_match_after_point() {
        let mut doc = Document::from_str("foo1 foo2 foo3");
        search_pattern(&mut doc, r"foo\d").unwrap();
        assert_eq!(doc.match_range, Some((0, 4)));
        assert_eq!(doc.point(), 4);
        search_pattern(&mut doc, r"foo\d").unwrap();
        assert_eq!(doc.match_range, Some((5, 9)));
    }

    #[test]
    fn wraps_to_start_once() {
        let mut doc = Document::from_str("abc def");
        doc.set_point(5);
        search_pattern(&mut doc, "abc").unwrap();
        assert_eq!(doc.match_range, Some((0, 3)));
        assert_eq!(doc.point(), 3);
    }

    #[test]
    fn missing_pattern_is_an_error() {
        let mut doc = Document::from_str("abc");
        let err = search_pattern(&mut doc, "zzz");
        assert!(err.is_err());
        assert_eq!(doc.point(), 0);
        assert_eq!(doc.match_range, None);
    }

    #[test]
    fn invalid_pattern_reports_diagnostic() {
        let mut doc = Document::from_str("abc");
        let err = search_pattern(&mut doc, "[unclosed");
        assert!(err.is_err());
    }

    #[test]
    fn matches_raw_bytes() {
        let mut doc = Document::from_bytes(vec![0xff, b'a', b'b'], "x".into(), None);
        search_pattern(&mut doc, "ab").unwrap();
        assert_eq!(doc.match_range, Some((1, 3)));
    }
}
