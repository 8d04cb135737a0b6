pub mod tui;

pub use tui::{InputEvent, Tui};
