//! 検索の結合テスト

use temacs::editor::Document;
use temacs::search::{search_pattern, Direction, IncrementalSearch};

fn type_term(search: &mut IncrementalSearch, doc: &mut Document, term: &str) {
    for ch in term.chars() {
        search.push_char(doc, ch);
    }
}

#[test]
fn test_repeat_finds_second_then_wraps_to_first() {
    // "foo" を繰り返し検索すると2つ目、次は折り返して1つ目
    let mut doc = Document::from_str("xx foo yy foo zz");
    let mut search = IncrementalSearch::new(&doc, Direction::Forward);
    type_term(&mut search, &mut doc, "foo");
    assert_eq!(doc.match_range, Some((3, 6)));
    search.repeat(&mut doc, Direction::Forward);
    assert_eq!(doc.match_range, Some((10, 13)));
    search.repeat(&mut doc, Direction::Forward);
    assert_eq!(doc.match_range, Some((3, 6)));
}

#[test]
fn test_commit_sets_mark_at_search_origin() {
    let mut doc = Document::from_str("abc needle xyz");
    doc.set_point(2);
    let mut search = IncrementalSearch::new(&doc, Direction::Forward);
    type_term(&mut search, &mut doc, "needle");
    search.commit(&mut doc);
    assert_eq!(doc.point(), 10);
    assert_eq!(doc.mark(), 2);
}

#[test]
fn test_cancel_restores_point() {
    let mut doc = Document::from_str("abc needle xyz");
    doc.set_point(2);
    let mut search = IncrementalSearch::new(&doc, Direction::Backward);
    type_term(&mut search, &mut doc, "abc");
    search.cancel(&mut doc);
    assert_eq!(doc.point(), 2);
    assert_eq!(doc.match_range, None);
}

#[test]
fn test_incremental_search_over_multibyte_text() {
    let mut doc = Document::from_str("\u{3042}\u{3044}\u{3046} abc");
    let mut search = IncrementalSearch::new(&doc, Direction::Forward);
    type_term(&mut search, &mut doc, "\u{3044}");
    assert_eq!(doc.match_range, Some((3, 6)));
    assert_eq!(doc.point(), 6);
}

#[test]
fn test_pattern_search_advances_and_wraps() {
    let mut doc = Document::from_str("cat dog cat");
    search_pattern(&mut doc, "cat").unwrap();
    assert_eq!(doc.match_range, Some((0, 3)));
    search_pattern(&mut doc, "cat").unwrap();
    assert_eq!(doc.match_range, Some((8, 11)));
    // 終端まで来たら先頭へ折り返す
    search_pattern(&mut doc, "cat").unwrap();
    assert_eq!(doc.match_range, Some((0, 3)));
}

#[test]
fn test_pattern_search_reports_invalid_pattern() {
    let mut doc = Document::from_str("abc");
    let err = search_pattern(&mut doc, "(unclosed").unwrap_err();
    assert!(err.user_message().starts_with("Invalid pattern"));
    assert_eq!(doc.point(), 0);
}

#[test]
fn test_pattern_search_not_found_keeps_state() {
    let mut doc = Document::from_str("abc");
    doc.set_point(1);
    assert!(search_pattern(&mut doc, "zzz").is_err());
    assert_eq!(doc.point(), 1);
    assert_eq!(doc.match_range, None);
}
