//! メインアプリケーション構造体
//!
//! エディタ全体の状態（ドキュメント・キルリング・ビューポート・キーマップ）
//! とメインループを実装する。コマンド実行は端末なしで呼べる `execute` と、
//! 入れ子の読み取りループを要する対話コマンドに分かれる。

use crate::config::EditorConfig;
use crate::editor::{ops, ActionTag, Document, KillRing};
use crate::error::{BufferError, FileError, Result, TemacsError};
use crate::file;
use crate::frontend::{InputEvent, Tui};
use crate::input::{Command, Dispatch, Key, KeyCode, Keymap};
use crate::minibuffer::{parse_byte, parse_lineno, parse_yes_or_no, Minibuffer, PromptResult};
use crate::search::{search_pattern, Direction, IncrementalSearch};
use crate::ui::{RenderedGrid, Viewport};
use std::time::Duration;

/// エディタ全体の状態
pub struct Editor {
    doc: Document,
    kill_ring: KillRing,
    viewport: Viewport,
    keymap: Keymap,
    message: String,
    quit: bool,
}

impl Editor {
    /// ファイル引数からエディタを組み立てる。引数なしは空バッファ。
    pub fn new(file_arg: Option<&str>, config: &EditorConfig) -> Result<Self> {
        let (doc, message) = match file_arg {
            Some(arg) => {
                let loaded = file::load(arg)?;
                let message = if loaded.is_new {
                    "(New file)".to_string()
                } else {
                    String::new()
                };
                log::info!("opened {} ({} bytes)", loaded.path.display(), loaded.bytes.len());
                (
                    Document::from_bytes(loaded.bytes, loaded.display_name, Some(loaded.path)),
                    message,
                )
            }
            None => (Document::from_str(""), String::new()),
        };
        Ok(Self::from_document(doc, config, message))
    }

    /// テキストから直接組み立てる（新規バッファ・テスト用）
    pub fn with_text(text: &str, config: &EditorConfig) -> Self {
        Self::from_document(Document::from_str(text), config, String::new())
    }

    fn from_document(mut doc: Document, config: &EditorConfig, message: String) -> Self {
        doc.set_tab_width(config.tab_width);
        let viewport = Viewport::new(&mut doc, 24, 80, config.render_retry_limit);
        Self {
            doc,
            kill_ring: KillRing::with_capacity(config.kill_ring_capacity),
            viewport,
            keymap: Keymap::default_bindings(),
            message,
            quit: false,
        }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn kill_ring(&self) -> &KillRing {
        &self.kill_ring
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// 現在の状態を1画面分のグリッドへ描画する
    pub fn render(&mut self) -> RenderedGrid {
        let message = std::mem::take(&mut self.message);
        self.viewport.render(&mut self.doc, &message)
    }

    /// 1画面で動く行数（スクロール・ページ送りの単位）
    fn page_lines(&self) -> isize {
        (self.viewport.rows() as isize - 4).max(1)
    }

    /// 端末を要しないコマンドを1つ実行する
    pub fn execute(&mut self, cmd: Command) -> Result<()> {
        self.doc.match_range = None;
        match cmd {
            Command::MoveCharForward => self.motion(|doc| doc.move_char(1)),
            Command::MoveCharBackward => self.motion(|doc| doc.move_char(-1)),
            Command::MoveLineDown => self.motion(|doc| doc.move_line(1)),
            Command::MoveLineUp => self.motion(|doc| doc.move_line(-1)),
            Command::MoveBol => self.motion(|doc| {
                doc.move_bol();
                Ok(())
            }),
            Command::MoveEol => self.motion(|doc| {
                doc.move_eol();
                Ok(())
            }),
            Command::MoveWordForward => self.motion(|doc| {
                let point = doc.point();
                let next = doc.engine().word_end_next(point);
                if next == point {
                    return Err(BufferError::AtEnd.into());
                }
                doc.set_point(next);
                doc.update_target_column();
                Ok(())
            }),
            Command::MoveWordBackward => self.motion(|doc| {
                let point = doc.point();
                let prev = doc.engine().word_begin_prev(point);
                if prev == point {
                    return Err(BufferError::AtStart.into());
                }
                doc.set_point(prev);
                doc.update_target_column();
                Ok(())
            }),
            Command::MoveParagraphForward => self.motion(|doc| doc.move_paragraph(1)),
            Command::MoveParagraphBackward => self.motion(|doc| doc.move_paragraph(-1)),
            Command::BufferStart => {
                self.doc.last_action = ActionTag::Other;
                self.doc.move_buffer_start();
                self.viewport.jump_top(&mut self.doc, 0);
                Ok(())
            }
            Command::BufferEnd => {
                self.doc.last_action = ActionTag::Other;
                self.doc.move_buffer_end();
                self.viewport.recenter(&mut self.doc);
                Ok(())
            }
            Command::PageDown => {
                self.doc.last_action = ActionTag::Other;
                let page = self.page_lines();
                self.viewport.scroll(&mut self.doc, page)
            }
            Command::PageUp => {
                self.doc.last_action = ActionTag::Other;
                let page = self.page_lines();
                self.viewport.scroll(&mut self.doc, -page)
            }
            Command::Recenter => {
                self.doc.last_action = ActionTag::Other;
                self.viewport.recenter(&mut self.doc);
                Ok(())
            }
            Command::SetMark => {
                self.doc.last_action = ActionTag::Other;
                self.doc.set_mark_at_point();
                self.message = "Mark set".to_string();
                Ok(())
            }
            Command::ExchangePointMark => {
                self.doc.last_action = ActionTag::Other;
                self.doc.exchange_point_mark();
                Ok(())
            }
            Command::Newline => ops::newline(&mut self.doc),
            Command::Backspace => ops::backspace(&mut self.doc),
            Command::DeleteForward => ops::delete_forward(&mut self.doc),
            Command::TransposeChars => ops::transpose_chars(&mut self.doc),
            Command::KillToEol => ops::kill_eol(&mut self.doc, &mut self.kill_ring),
            Command::KillWord => ops::kill_word(&mut self.doc, &mut self.kill_ring),
            Command::BackwardKillWord => {
                ops::backward_kill_word(&mut self.doc, &mut self.kill_ring)
            }
            Command::CapitalizeWord => ops::capitalize_word(&mut self.doc),
            Command::IndentMagic => ops::indent_magic(&mut self.doc),
            Command::KillRegion => ops::kill_region(&mut self.doc, &mut self.kill_ring),
            Command::Yank => ops::yank(&mut self.doc, &mut self.kill_ring),
            Command::YankPop => ops::yank_pop(&mut self.doc, &mut self.kill_ring),
            Command::Undo => {
                ops::undo(&mut self.doc)?;
                self.message = "Undo".to_string();
                Ok(())
            }
            Command::Save => self.save(),
            Command::Quit => {
                self.quit = true;
                Ok(())
            }
            // 対話コマンドは run 側で処理される
            Command::KillRegionSave
            | Command::InsertByte
            | Command::SaveAs
            | Command::GotoLine
            | Command::IsearchForward
            | Command::IsearchBackward
            | Command::PatternSearch
            | Command::WantQuit
            | Command::Suspend
            | Command::Abort => Ok(()),
        }
    }

    fn motion(&mut self, f: impl FnOnce(&mut Document) -> Result<()>) -> Result<()> {
        self.doc.last_action = ActionTag::Other;
        f(&mut self.doc)
    }

    /// 文字の自己挿入
    pub fn insert(&mut self, ch: char) -> Result<()> {
        self.doc.match_range = None;
        ops::insert_char(&mut self.doc, ch)
    }

    /// 1始まりの行番号へ移動
    pub fn goto_line(&mut self, lineno: usize) -> Result<()> {
        self.doc.last_action = ActionTag::Other;
        match self.doc.engine().pos_by_lineno(lineno) {
            Some(pos) => {
                self.doc.set_point(pos);
                self.doc.update_target_column();
                Ok(())
            }
            None => Err(BufferError::AtEnd.into()),
        }
    }

    /// 現在のパスへ保存する。パス未設定なら失敗し、呼び出し側が
    /// save-as に切り替える。
    pub fn save(&mut self) -> Result<()> {
        self.doc.last_action = ActionTag::Other;
        let path = self.doc.file_path.clone().ok_or_else(|| {
            TemacsError::from(FileError::InvalidPath {
                path: String::new(),
            })
        })?;
        self.doc.engine_mut().save(&path)?;
        self.message = format!("Wrote {}", path.display());
        log::info!("saved {}", path.display());
        Ok(())
    }

    /// 新しいパスへ保存し、以後そのパスを使う
    pub fn save_as(&mut self, input: &str) -> Result<()> {
        let path = file::expand_path(input)?;
        self.doc.display_name = file::display_name(&path);
        self.doc.file_path = Some(path);
        self.save()
    }

    // ── メインループ ────────────────────────────────

    /// イベントループ。quitが立つまで 描画→読取→実行 を繰り返す。
    pub fn run(&mut self, tui: &mut Tui) -> Result<()> {
        while !self.quit {
            self.draw(tui)?;
            match tui.read_event()? {
                InputEvent::Resize => continue,
                InputEvent::Key(key) => self.dispatch_key(tui, key)?,
            }
        }
        Ok(())
    }

    /// 現在のメッセージで1フレーム描く
    fn draw(&mut self, tui: &mut Tui) -> Result<()> {
        let (rows, cols) = tui.size()?;
        self.viewport.set_dimensions(rows, cols);
        let grid = self.render();
        tui.draw(&grid)
    }

    /// メッセージを差し替えて1フレーム描く（サブループ用）
    fn draw_with_message(&mut self, tui: &mut Tui, message: &str) -> Result<()> {
        self.message = message.to_string();
        self.draw(tui)
    }

    /// キー1つをプレフィックス込みで解決して実行する
    fn dispatch_key(&mut self, tui: &mut Tui, key: Key) -> Result<()> {
        match self.keymap.lookup(key) {
            Dispatch::Insert(ch) => {
                if let Err(err) = self.insert(ch) {
                    self.alert(tui, &err);
                }
            }
            Dispatch::Command(cmd) => self.run_command(tui, cmd)?,
            Dispatch::PrefixX => {
                let next = self.read_key(tui)?;
                match self.keymap.lookup_prefix_x(next) {
                    Some(cmd) => self.run_command(tui, cmd)?,
                    None => self.alert_text(tui, &format!("unknown key C-x {}", next.describe())),
                }
            }
            Dispatch::PrefixMeta => {
                let next = self.read_key(tui)?;
                match self.keymap.lookup_meta(next) {
                    Some(cmd) => self.run_command(tui, cmd)?,
                    None => self.alert_text(tui, &format!("unknown key M-{}", next.describe())),
                }
            }
            Dispatch::Unknown => {
                self.alert_text(tui, &format!("unknown key {}", key.describe()));
            }
        }
        Ok(())
    }

    /// 次のキーをブロッキングで読む（リサイズは読み飛ばす）
    fn read_key(&mut self, tui: &mut Tui) -> Result<Key> {
        loop {
            match tui.read_event()? {
                InputEvent::Key(key) => return Ok(key),
                InputEvent::Resize => self.draw(tui)?,
            }
        }
    }

    /// コマンドを実行する。対話コマンドはここでサブループを回す。
    fn run_command(&mut self, tui: &mut Tui, cmd: Command) -> Result<()> {
        match cmd {
            Command::Abort => {
                self.alert_text(tui, "Quit");
                Ok(())
            }
            Command::Suspend => {
                self.doc.last_action = ActionTag::Other;
                tui.suspend()
            }
            Command::WantQuit => {
                if self.doc.modified() {
                    if self.yes_or_no(tui, "Modified buffers exist; really exit? (yes or no)")? {
                        self.quit = true;
                    }
                } else {
                    self.quit = true;
                }
                Ok(())
            }
            Command::Save => {
                if self.doc.file_path.is_some() {
                    if let Err(err) = self.save() {
                        self.alert(tui, &err);
                    }
                    Ok(())
                } else {
                    self.save_as_interactive(tui)
                }
            }
            Command::SaveAs => self.save_as_interactive(tui),
            Command::GotoLine => {
                if let Some(input) = self.read_minibuffer(tui, "Goto line:", "")? {
                    let result = parse_lineno(&input).and_then(|n| self.goto_line(n));
                    if let Err(err) = result {
                        self.alert(tui, &err);
                    }
                }
                Ok(())
            }
            Command::InsertByte => {
                if let Some(input) = self.read_minibuffer(tui, "Insert byte:", "")? {
                    let result =
                        parse_byte(&input).and_then(|b| ops::quoted_insert(&mut self.doc, b));
                    if let Err(err) = result {
                        self.alert(tui, &err);
                    }
                }
                Ok(())
            }
            Command::PatternSearch => {
                if let Some(pattern) = self.read_minibuffer(tui, "RE search:", "")? {
                    self.doc.last_action = ActionTag::Other;
                    if let Err(err) = search_pattern(&mut self.doc, &pattern) {
                        self.alert(tui, &err);
                    }
                }
                Ok(())
            }
            Command::IsearchForward => self.isearch(tui, Direction::Forward),
            Command::IsearchBackward => self.isearch(tui, Direction::Backward),
            Command::KillRegionSave => self.kill_region_save(tui),
            other => {
                if let Err(err) = self.execute(other) {
                    self.alert(tui, &err);
                }
                Ok(())
            }
        }
    }

    /// エラーをメッセージ行と警告音で知らせる
    fn alert(&mut self, tui: &mut Tui, err: &TemacsError) {
        log::debug!("alert: {}", err.user_message());
        self.message = err.user_message();
        tui.flash();
    }

    fn alert_text(&mut self, tui: &mut Tui, text: &str) {
        self.message = text.to_string();
        tui.flash();
    }

    /// ミニバッファで1行読む。中断は `None`。
    fn read_minibuffer(
        &mut self,
        tui: &mut Tui,
        prompt: &str,
        prefill: &str,
    ) -> Result<Option<String>> {
        let mut mb = Minibuffer::new(prompt, prefill);
        loop {
            self.draw_with_message(tui, &mb.display_line())?;
            let key = match tui.read_event()? {
                InputEvent::Resize => continue,
                InputEvent::Key(key) => key,
            };
            let result = if key == Key::ctrl('g') {
                mb.cancel()
            } else if key == Key::plain(KeyCode::Enter)
                || key == Key::ctrl('j')
                || key == Key::ctrl('m')
            {
                mb.accept()
            } else if key == Key::plain(KeyCode::Backspace) {
                mb.erase()
            } else if let Some(ch) = key.printable() {
                mb.push_char(ch)
            } else {
                self.alert_text(tui, &format!("unknown key {}", key.describe()));
                self.draw(tui)?;
                std::thread::sleep(Duration::from_millis(700));
                PromptResult::Pending
            };
            match result {
                PromptResult::Pending => {}
                PromptResult::Accept(input) => return Ok(Some(input)),
                PromptResult::Cancel => {
                    self.alert_text(tui, "Quit");
                    return Ok(None);
                }
            }
        }
    }

    /// yes か no と答えるまで聞き直す
    fn yes_or_no(&mut self, tui: &mut Tui, question: &str) -> Result<bool> {
        loop {
            let answer = match self.read_minibuffer(tui, question, "")? {
                None => return Ok(false),
                Some(answer) => answer,
            };
            match parse_yes_or_no(&answer) {
                Some(value) => return Ok(value),
                None => {
                    self.alert_text(tui, "Please answer yes or no.");
                    self.draw(tui)?;
                    std::thread::sleep(Duration::from_secs(1));
                }
            }
        }
    }

    fn save_as_interactive(&mut self, tui: &mut Tui) -> Result<()> {
        let prefill = self
            .doc
            .file_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(input) = self.read_minibuffer(tui, "Write file:", &prefill)? {
            if let Err(err) = self.save_as(&input) {
                self.alert(tui, &err);
            }
        }
        Ok(())
    }

    /// インクリメンタル検索のサブループ
    fn isearch(&mut self, tui: &mut Tui, direction: Direction) -> Result<()> {
        let mut search = IncrementalSearch::new(&self.doc, direction);
        loop {
            self.draw_with_message(tui, &search.prompt())?;
            let key = match tui.read_event()? {
                InputEvent::Resize => continue,
                InputEvent::Key(key) => key,
            };
            if key == Key::ctrl('g') {
                search.cancel(&mut self.doc);
                self.alert_text(tui, "Quit");
                return Ok(());
            }
            if key == Key::ctrl('s') {
                if search.repeat(&mut self.doc, Direction::Forward) {
                    tui.flash();
                }
                continue;
            }
            if key == Key::ctrl('r') {
                if search.repeat(&mut self.doc, Direction::Backward) {
                    tui.flash();
                }
                continue;
            }
            if key == Key::plain(KeyCode::Backspace) {
                search.erase(&mut self.doc);
                continue;
            }
            if key == Key::ctrl('u') {
                search.clear(&mut self.doc);
                continue;
            }
            if let Some(ch) = key.printable() {
                if search.push_char(&mut self.doc, ch) {
                    tui.flash();
                }
                continue;
            }
            // その他のキーは確定して通常ディスパッチへ回す
            search.commit(&mut self.doc);
            self.doc.last_action = ActionTag::Other;
            if key != Key::plain(KeyCode::Enter) && key != Key::ctrl('m') && key != Key::ctrl('j') {
                self.dispatch_key(tui, key)?;
            }
            return Ok(());
        }
    }

    /// リージョンをコピーし、カーソルを一瞬マーク位置へ飛ばして見せる
    fn kill_region_save(&mut self, tui: &mut Tui) -> Result<()> {
        let (lo, hi) = self.doc.region();
        ops::kill_region_save(&mut self.doc, &mut self.kill_ring);
        if lo == hi {
            return Ok(());
        }
        let point = self.doc.point();
        let mark = self.doc.mark();
        self.doc.set_point(mark);
        self.draw_with_message(tui, "")?;
        // キーが来るか0.5秒経つまで見せる。キーは消費しない。
        let _ = crossterm::event::poll(Duration::from_millis(500));
        self.doc.set_point(point);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with(text: &str) -> Editor {
        let config = EditorConfig::default();
        let mut editor = Editor::with_text(text, &config);
        editor.viewport.set_dimensions(10, 40);
        editor
    }

    #[test]
    fn movement_commands_move_point() {
        let mut editor = editor_with("abc\ndef\n");
        editor.execute(Command::MoveCharForward).unwrap();
        assert_eq!(editor.doc().point(), 1);
        editor.execute(Command::MoveLineDown).unwrap();
        assert_eq!(editor.doc().point(), 5);
        editor.execute(Command::MoveBol).unwrap();
        assert_eq!(editor.doc().point(), 4);
        editor.execute(Command::MoveEol).unwrap();
        assert_eq!(editor.doc().point(), 7);
    }

    #[test]
    fn movement_breaks_insert_coalescing() {
        let mut editor = editor_with("");
        editor.insert('a').unwrap();
        editor.insert('b').unwrap();
        editor.execute(Command::MoveCharBackward).unwrap();
        editor.insert('c').unwrap();
        // 移動を挟んだので undo は2段
        editor.execute(Command::Undo).unwrap();
        assert_eq!(editor.doc().engine().contents(), b"ab");
        editor.execute(Command::Undo).unwrap();
        assert_eq!(editor.doc().engine().contents(), b"");
    }

    #[test]
    fn boundary_errors_surface_from_execute() {
        let mut editor = editor_with("");
        assert!(editor.execute(Command::MoveCharForward).is_err());
        assert!(editor.execute(Command::Backspace).is_err());
        assert!(editor.execute(Command::Undo).is_err());
    }

    #[test]
    fn word_motion_stops_at_buffer_edges() {
        let mut editor = editor_with("one two");
        editor.execute(Command::MoveWordForward).unwrap();
        assert_eq!(editor.doc().point(), 3);
        editor.execute(Command::MoveWordForward).unwrap();
        assert_eq!(editor.doc().point(), 7);
        assert!(editor.execute(Command::MoveWordForward).is_err());
    }

    #[test]
    fn goto_line_validates_range() {
        let mut editor = editor_with("a\nb\nc\n");
        editor.goto_line(3).unwrap();
        assert_eq!(editor.doc().point(), 4);
        assert!(editor.goto_line(100).is_err());
    }

    #[test]
    fn kill_and_yank_round_trip() {
        let mut editor = editor_with("hello world\n");
        // 行頭からのキルは改行ごと行全体を取る
        editor.execute(Command::KillToEol).unwrap();
        assert_eq!(editor.doc().engine().contents(), b"");
        editor.execute(Command::Yank).unwrap();
        assert_eq!(editor.doc().engine().contents(), b"hello world\n");
    }

    #[test]
    fn region_save_command_is_interactive_only() {
        let mut editor = editor_with("abc");
        // 端末なしの execute では no-op（サブループ側で処理される）
        editor.execute(Command::KillRegionSave).unwrap();
        assert!(editor.kill_ring().is_empty());
        assert_eq!(editor.doc().engine().contents(), b"abc");
    }

    #[test]
    fn buffer_start_resets_viewport_top() {
        let text = "0\n1\n2\n3\n4\n5\n6\n7\n8\n9\n10\n11\n12\n13\n14\n";
        let mut editor = editor_with(text);
        editor.execute(Command::BufferEnd).unwrap();
        editor.render();
        editor.execute(Command::BufferStart).unwrap();
        assert_eq!(editor.doc().point(), 0);
        let top = editor.viewport.top(&editor.doc);
        assert_eq!(top, 0);
    }

    #[test]
    fn save_without_path_is_rejected() {
        let mut editor = editor_with("abc");
        assert!(editor.save().is_err());
        assert!(editor.doc().modified() || editor.doc().engine().size() == 3);
    }

    #[test]
    fn save_as_writes_file_and_clears_modified() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut editor = editor_with("");
        editor.insert('h').unwrap();
        editor.insert('i').unwrap();
        assert!(editor.doc().modified());
        editor.save_as(path.to_str().unwrap()).unwrap();
        assert!(!editor.doc().modified());
        assert_eq!(std::fs::read(&path).unwrap(), b"hi");
        assert_eq!(editor.doc().display_name, "out.txt");
    }

    #[test]
    fn quit_command_sets_flag() {
        let mut editor = editor_with("");
        assert!(!editor.quit_requested());
        editor.execute(Command::Quit).unwrap();
        assert!(editor.quit_requested());
    }

    #[test]
    fn render_consumes_message() {
        let mut editor = editor_with("abc");
        editor.set_message("hello");
        let grid = editor.render();
        assert_eq!(grid.row_text(grid.rows - 1), "hello");
        let grid = editor.render();
        assert_eq!(grid.row_text(grid.rows - 1), "");
    }
}
