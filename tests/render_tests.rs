//! ビューポート描画の結合テスト
//!
//! グリッド出力を文字列として検査する。折り返し・キャレット記法・
//! 不正バイト・ステータス行・カーソル追従を対象にする。

use temacs::config::EditorConfig;
use temacs::editor::Document;
use temacs::ui::Viewport;

fn grid_for(text: &str, rows: usize, cols: usize) -> (temacs::ui::RenderedGrid, Document) {
    let mut doc = Document::from_str(text);
    let mut view = Viewport::new(&mut doc, rows, cols, EditorConfig::default().render_retry_limit);
    let grid = view.render(&mut doc, "");
    (grid, doc)
}

#[test]
fn test_screen_layout_rows() {
    // 上から内容、末尾改行の空行、~埋め、ステータス、メッセージの順
    let (grid, _) = grid_for("only line\n", 5, 30);
    assert_eq!(grid.row_text(0), "only line");
    assert_eq!(grid.row_text(1), "");
    assert_eq!(grid.row_text(2), "~");
    assert!(grid.row_text(3).contains("*scratch*"));
    assert_eq!(grid.row_text(4), "");
}

#[test]
fn test_wrap_marker_in_last_column() {
    let (grid, _) = grid_for("0123456789\n", 6, 6);
    assert_eq!(grid.row_text(0), "01234\\");
    assert_eq!(grid.row_text(1), "56789");
}

#[test]
fn test_cursor_on_wrap_boundary_lands_on_next_row() {
    let mut doc = Document::from_str("0123456789\n");
    doc.set_point(5);
    let mut view = Viewport::new(&mut doc, 6, 6, 8);
    let grid = view.render(&mut doc, "");
    // 折り返し境界ちょうどのポイントは次行の先頭
    assert_eq!(grid.cursor, (1, 0));
}

#[test]
fn test_control_bytes_render_as_caret_pairs() {
    let (grid, _) = grid_for("x\x02y\n", 5, 30);
    assert_eq!(grid.row_text(0), "x^By");
    assert!(grid.cell(0, 1).bold);
    assert!(grid.cell(0, 2).bold);
    assert!(!grid.cell(0, 3).bold);
}

#[test]
fn test_del_byte_renders_as_caret_question() {
    let mut doc = Document::from_bytes(vec![0x7f, b'\n'], "x".into(), None);
    let mut view = Viewport::new(&mut doc, 5, 30, 8);
    let grid = view.render(&mut doc, "");
    assert_eq!(grid.row_text(0), "^?");
}

#[test]
fn test_invalid_utf8_renders_as_reversed_hex() {
    let mut doc = Document::from_bytes(vec![b'a', 0xc3, b'x', b'\n'], "x".into(), None);
    let mut view = Viewport::new(&mut doc, 5, 30, 8);
    let grid = view.render(&mut doc, "");
    // 0xc3 に続くのが継続バイトでないので単独の不正バイトになる
    assert_eq!(grid.row_text(0), "ac3x");
    assert!(grid.cell(0, 1).reverse);
    assert!(grid.cell(0, 2).reverse);
    assert!(!grid.cell(0, 3).reverse);
}

#[test]
fn test_valid_multibyte_renders_as_one_glyph() {
    let (grid, _) = grid_for("a\u{3042}b\n", 5, 30);
    assert_eq!(grid.cell(0, 0).ch, 'a');
    assert_eq!(grid.cell(0, 1).ch, '\u{3042}');
    // 全角は2桁を占める
    assert_eq!(grid.cell(0, 3).ch, 'b');
}

#[test]
fn test_eof_marker_only_without_trailing_newline() {
    let (grid, _) = grid_for("abc", 5, 30);
    assert_eq!(grid.row_text(0), "abc\u{25ca}");
    let (grid, _) = grid_for("abc\n", 5, 30);
    assert_eq!(grid.row_text(0), "abc");
    assert_eq!(grid.row_text(1), "");
}

#[test]
fn test_status_line_shows_line_column_and_bytes() {
    let mut doc = Document::from_str("first\nsecond\n");
    doc.set_point(9);
    let mut view = Viewport::new(&mut doc, 6, 50, 8);
    let grid = view.render(&mut doc, "");
    let status = grid.row_text(4);
    assert!(status.contains("L2"), "{status}");
    assert!(status.contains("C4"), "{status}");
    assert!(status.contains("B9/13"), "{status}");
    assert!(status.starts_with("-----"), "{status}");
}

#[test]
fn test_modified_flag_in_status_line() {
    let mut doc = Document::from_str("abc");
    doc.engine_mut().snapshot();
    doc.engine_mut().insert(0, b"x").unwrap();
    let mut view = Viewport::new(&mut doc, 6, 50, 8);
    let grid = view.render(&mut doc, "");
    assert!(grid.row_text(4).starts_with("--**-"));
}

#[test]
fn test_point_below_window_is_brought_into_view() {
    let text: String = (0..200).map(|i| format!("line {}\n", i)).collect();
    let mut doc = Document::from_str(&text);
    doc.move_buffer_end();
    let mut view = Viewport::new(&mut doc, 10, 40, 8);
    let grid = view.render(&mut doc, "");
    // ポイントが描画範囲に入り、カーソルが置かれている
    assert!(view.top(&doc) > 0);
    assert!(doc.point() <= view.rendered_end());
    assert!(grid.cursor.0 < 8);
}

#[test]
fn test_scroll_keeps_target_column() {
    let text: String = (0..30).map(|i| format!("column test {}\n", i)).collect();
    let mut doc = Document::from_str(&text);
    doc.set_point(5 * 14 + 7); // 6行目の8桁目
    doc.update_target_column();
    let mut view = Viewport::new(&mut doc, 10, 40, 8);
    // スクロール後もポイントは窓の中なのでカラムを保つ
    view.scroll(&mut doc, 3).unwrap();
    let point = doc.point();
    let bol = doc.engine().line_begin(point);
    assert_eq!(point - bol, 7);
}

#[test]
fn test_message_line_is_last_row() {
    let mut doc = Document::from_str("abc\n");
    let mut view = Viewport::new(&mut doc, 6, 40, 8);
    let grid = view.render(&mut doc, "Wrote /tmp/x");
    assert_eq!(grid.row_text(5), "Wrote /tmp/x");
}
