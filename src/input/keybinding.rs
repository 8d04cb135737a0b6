//! キーバインドシステム
//!
//! crosstermのキーイベントを内部表現 `Key` に正規化し、既定キーマップで
//! コマンドへ解決する。C-x と ESC (M-) は2キーのプレフィックスとして扱う。

use crossterm::event::{KeyCode as CtKeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// キー入力の内部表現
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub ctrl: bool,
    pub alt: bool,
    pub code: KeyCode,
}

/// 基本キーコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Esc,
    Unknown,
}

impl Key {
    pub fn plain(code: KeyCode) -> Self {
        Self {
            ctrl: false,
            alt: false,
            code,
        }
    }

    pub fn char(ch: char) -> Self {
        Self::plain(KeyCode::Char(ch))
    }

    pub fn ctrl(ch: char) -> Self {
        Self {
            ctrl: true,
            alt: false,
            code: KeyCode::Char(ch),
        }
    }

    pub fn alt(ch: char) -> Self {
        Self {
            ctrl: false,
            alt: true,
            code: KeyCode::Char(ch),
        }
    }

    /// crosstermのイベントから変換する
    pub fn from_event(event: KeyEvent) -> Self {
        let code = match event.code {
            CtKeyCode::Char(ch) => KeyCode::Char(ch),
            CtKeyCode::Enter => KeyCode::Enter,
            CtKeyCode::Backspace => KeyCode::Backspace,
            CtKeyCode::Delete => KeyCode::Delete,
            CtKeyCode::Tab => KeyCode::Tab,
            CtKeyCode::BackTab => KeyCode::Tab,
            CtKeyCode::Up => KeyCode::Up,
            CtKeyCode::Down => KeyCode::Down,
            CtKeyCode::Left => KeyCode::Left,
            CtKeyCode::Right => KeyCode::Right,
            CtKeyCode::Home => KeyCode::Home,
            CtKeyCode::End => KeyCode::End,
            CtKeyCode::PageUp => KeyCode::PageUp,
            CtKeyCode::PageDown => KeyCode::PageDown,
            CtKeyCode::Esc => KeyCode::Esc,
            _ => KeyCode::Unknown,
        };
        Self {
            ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
            alt: event.modifiers.contains(KeyModifiers::ALT),
            code,
        }
    }

    /// 修飾なしの印字可能文字なら取り出す
    pub fn printable(&self) -> Option<char> {
        if self.ctrl || self.alt {
            return None;
        }
        match self.code {
            KeyCode::Char(ch) if !ch.is_control() => Some(ch),
            _ => None,
        }
    }

    /// メッセージ表示用のキー名
    pub fn describe(&self) -> String {
        let mut name = String::new();
        if self.ctrl {
            name.push_str("C-");
        }
        if self.alt {
            name.push_str("M-");
        }
        match self.code {
            KeyCode::Char(ch) => name.push(ch),
            other => name.push_str(&format!("{:?}", other).to_lowercase()),
        }
        name
    }
}

/// エディタコマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    // 移動
    MoveCharForward,
    MoveCharBackward,
    MoveLineDown,
    MoveLineUp,
    MoveBol,
    MoveEol,
    MoveWordForward,
    MoveWordBackward,
    MoveParagraphForward,
    MoveParagraphBackward,
    BufferStart,
    BufferEnd,
    PageDown,
    PageUp,
    Recenter,
    // 編集
    Newline,
    Backspace,
    DeleteForward,
    TransposeChars,
    KillToEol,
    KillWord,
    BackwardKillWord,
    CapitalizeWord,
    IndentMagic,
    InsertByte,
    // マークとキルリング
    SetMark,
    ExchangePointMark,
    KillRegion,
    KillRegionSave,
    Yank,
    YankPop,
    Undo,
    // 検索
    IsearchForward,
    IsearchBackward,
    PatternSearch,
    // ファイル・制御
    Save,
    SaveAs,
    GotoLine,
    Quit,
    WantQuit,
    Suspend,
    Abort,
}

/// キー1つの解決結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Command(Command),
    /// C-x プレフィックス。次のキーを待つ。
    PrefixX,
    /// ESC プレフィックス。次のキーを待つ。
    PrefixMeta,
    /// 印字可能文字の自己挿入
    Insert(char),
    Unknown,
}

/// 既定キーマップ
#[derive(Debug)]
pub struct Keymap {
    global: HashMap<Key, Command>,
    prefix_x: HashMap<Key, Command>,
    meta: HashMap<Key, Command>,
}

impl Keymap {
    pub fn default_bindings() -> Self {
        let mut global = HashMap::new();
        let mut prefix_x = HashMap::new();
        let mut meta = HashMap::new();

        global.insert(Key::ctrl(' '), Command::SetMark);
        global.insert(Key::ctrl('@'), Command::SetMark);
        global.insert(Key::ctrl('a'), Command::MoveBol);
        global.insert(Key::ctrl('b'), Command::MoveCharBackward);
        global.insert(Key::ctrl('c'), Command::Quit);
        global.insert(Key::ctrl('d'), Command::DeleteForward);
        global.insert(Key::ctrl('e'), Command::MoveEol);
        global.insert(Key::ctrl('f'), Command::MoveCharForward);
        global.insert(Key::ctrl('g'), Command::Abort);
        global.insert(Key::ctrl('j'), Command::Newline);
        global.insert(Key::ctrl('m'), Command::Newline);
        global.insert(Key::ctrl('k'), Command::KillToEol);
        global.insert(Key::ctrl('l'), Command::Recenter);
        global.insert(Key::ctrl('n'), Command::MoveLineDown);
        global.insert(Key::ctrl('p'), Command::MoveLineUp);
        global.insert(Key::ctrl('q'), Command::InsertByte);
        global.insert(Key::ctrl('r'), Command::IsearchBackward);
        global.insert(Key::ctrl('s'), Command::IsearchForward);
        global.insert(Key::ctrl('t'), Command::TransposeChars);
        global.insert(Key::ctrl('v'), Command::PageDown);
        global.insert(Key::ctrl('w'), Command::KillRegion);
        global.insert(Key::ctrl('y'), Command::Yank);
        global.insert(Key::ctrl('z'), Command::Suspend);
        global.insert(Key::ctrl('_'), Command::Undo);
        global.insert(Key::ctrl('/'), Command::Undo);

        global.insert(Key::plain(KeyCode::Enter), Command::Newline);
        global.insert(Key::plain(KeyCode::Backspace), Command::Backspace);
        global.insert(Key::plain(KeyCode::Delete), Command::DeleteForward);
        global.insert(Key::plain(KeyCode::Tab), Command::IndentMagic);
        global.insert(Key::plain(KeyCode::Left), Command::MoveCharBackward);
        global.insert(Key::plain(KeyCode::Right), Command::MoveCharForward);
        global.insert(Key::plain(KeyCode::Up), Command::MoveLineUp);
        global.insert(Key::plain(KeyCode::Down), Command::MoveLineDown);
        global.insert(Key::plain(KeyCode::Home), Command::MoveBol);
        global.insert(Key::plain(KeyCode::End), Command::MoveEol);
        global.insert(Key::plain(KeyCode::PageUp), Command::PageUp);
        global.insert(Key::plain(KeyCode::PageDown), Command::PageDown);

        prefix_x.insert(Key::ctrl('c'), Command::WantQuit);
        prefix_x.insert(Key::ctrl('g'), Command::Abort);
        prefix_x.insert(Key::ctrl('s'), Command::Save);
        prefix_x.insert(Key::ctrl('w'), Command::SaveAs);
        prefix_x.insert(Key::ctrl('x'), Command::ExchangePointMark);

        meta.insert(Key::char('<'), Command::BufferStart);
        meta.insert(Key::char('>'), Command::BufferEnd);
        meta.insert(Key::char('{'), Command::MoveParagraphBackward);
        meta.insert(Key::char('}'), Command::MoveParagraphForward);
        meta.insert(Key::char('v'), Command::PageUp);
        meta.insert(Key::char('w'), Command::KillRegionSave);
        meta.insert(Key::char('f'), Command::MoveWordForward);
        meta.insert(Key::char('b'), Command::MoveWordBackward);
        meta.insert(Key::char('d'), Command::KillWord);
        meta.insert(Key::char('c'), Command::CapitalizeWord);
        meta.insert(Key::char('y'), Command::YankPop);
        meta.insert(Key::char('g'), Command::GotoLine);
        meta.insert(Key::char('r'), Command::PatternSearch);
        meta.insert(Key::ctrl('g'), Command::Abort);
        meta.insert(Key::plain(KeyCode::Backspace), Command::BackwardKillWord);

        Self {
            global,
            prefix_x,
            meta,
        }
    }

    /// 通常状態のキー解決
    pub fn lookup(&self, key: Key) -> Dispatch {
        if key == Key::ctrl('x') {
            return Dispatch::PrefixX;
        }
        if key.code == KeyCode::Esc && !key.ctrl && !key.alt {
            return Dispatch::PrefixMeta;
        }
        if key.alt {
            let stripped = Key {
                alt: false,
                ..key
            };
            return match self.meta.get(&stripped) {
                Some(&cmd) => Dispatch::Command(cmd),
                None => Dispatch::Unknown,
            };
        }
        if let Some(&cmd) = self.global.get(&key) {
            return Dispatch::Command(cmd);
        }
        if let Some(ch) = key.printable() {
            return Dispatch::Insert(ch);
        }
        Dispatch::Unknown
    }

    /// C-x プレフィックス後のキー解決
    pub fn lookup_prefix_x(&self, key: Key) -> Option<Command> {
        self.prefix_x.get(&key).copied()
    }

    /// ESC プレフィックス後のキー解決
    pub fn lookup_meta(&self, key: Key) -> Option<Command> {
        self.meta.get(&key).copied()
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::default_bindings()
    }
}
