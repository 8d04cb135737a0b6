//! ターミナルフロントエンド
//!
//! crosstermでrawモードと代替スクリーンを管理し、描画済みグリッドを
//! ratatuiのフレームバッファへ写す。入力はブロッキング読みで、キーと
//! リサイズだけをアプリへ渡す。

use crate::error::{Result, UiError};
use crate::input::Key;
use crate::ui::grid::RenderedGrid;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Position;
use ratatui::style::{Modifier, Style};
use ratatui::Terminal;
use std::io::{stdout, Stdout, Write};

/// フロントエンドがアプリへ渡す入力イベント
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    Resize,
}

pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    /// rawモードへ入り代替スクリーンを開く
    pub fn new() -> Result<Self> {
        enter_terminal()?;
        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend).map_err(|err| {
            // 端末が作れなければrawモードだけでも戻す
            let _ = leave_terminal();
            UiError::TerminalInit {
                message: err.to_string(),
            }
        })?;
        Ok(Self { terminal })
    }

    /// 端末サイズを (行数, 桁数) で返す
    pub fn size(&self) -> Result<(usize, usize)> {
        let size = self
            .terminal
            .size()
            .map_err(|err| terminal_error("query size", err))?;
        Ok((size.height as usize, size.width as usize))
    }

    /// グリッドを端末へ描く
    pub fn draw(&mut self, grid: &RenderedGrid) -> Result<()> {
        self.terminal
            .draw(|frame| {
                let area = frame.area();
                let buf = frame.buffer_mut();
                for row in 0..grid.rows.min(area.height as usize) {
                    let mut col = 0;
                    while col < grid.cols.min(area.width as usize) {
                        let cell = grid.cell(row, col);
                        if cell.is_continuation() {
                            col += 1;
                            continue;
                        }
                        let mut style = Style::default();
                        if cell.bold {
                            style = style.add_modifier(Modifier::BOLD);
                        }
                        if cell.reverse {
                            style = style.add_modifier(Modifier::REVERSED);
                        }
                        if let Some(target) = buf.cell_mut(Position::new(col as u16, row as u16)) {
                            target.set_char(cell.ch);
                            target.set_style(style);
                        }
                        col += 1;
                    }
                }
                let (cursor_row, cursor_col) = grid.cursor;
                frame.set_cursor_position(Position::new(cursor_col as u16, cursor_row as u16));
            })
            .map_err(|err| terminal_error("draw", err))?;
        Ok(())
    }

    /// 次の入力イベントをブロッキングで読む
    pub fn read_event(&mut self) -> Result<InputEvent> {
        loop {
            match event::read().map_err(|err| terminal_error("event read", err))? {
                Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                    return Ok(InputEvent::Key(Key::from_event(key_event)));
                }
                Event::Resize(_, _) => return Ok(InputEvent::Resize),
                _ => {}
            }
        }
    }

    /// 境界条件などの警告音 (BEL)
    pub fn flash(&mut self) {
        let mut out = stdout();
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
    }

    /// ジョブ制御による一時停止。再開後は全面を描き直す。
    pub fn suspend(&mut self) -> Result<()> {
        leave_terminal()?;
        // SAFETY: 自プロセスへのシグナル送出のみ
        unsafe {
            libc::raise(libc::SIGTSTP);
        }
        enter_terminal()?;
        self.terminal
            .clear()
            .map_err(|err| terminal_error("clear after resume", err))?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        let _ = leave_terminal();
    }
}

fn enter_terminal() -> Result<()> {
    enable_raw_mode().map_err(|err| terminal_error("enable raw mode", err))?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)
        .map_err(|err| terminal_error("enter alternate screen", err))?;
    Ok(())
}

fn leave_terminal() -> Result<()> {
    let mut out = stdout();
    execute!(out, LeaveAlternateScreen)
        .map_err(|err| terminal_error("leave alternate screen", err))?;
    disable_raw_mode().map_err(|err| terminal_error("disable raw mode", err))?;
    Ok(())
}

fn terminal_error(context: &str, err: impl std::fmt::Display) -> crate::error::TemacsError {
    UiError::RenderingFailed {
        component: format!("{}: {}", context, err),
    }
    .into()
}
