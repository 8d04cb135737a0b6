//! ミニバッファ
//!
//! 画面最下行で1行の文字列入力を受け付ける小さな状態機械。
//! キーを1つずつ渡し、確定・中断・継続のいずれかを返す。
//! goto行番号やバイト挿入の数値解析もここで行う。

use crate::error::{InputError, Result};

/// キー1つを処理した結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    /// 入力続行
    Pending,
    /// Enterで確定した入力
    Accept(String),
    /// C-gで中断
    Cancel,
}

/// 1行入力の進行状態
#[derive(Debug)]
pub struct Minibuffer {
    prompt: String,
    input: String,
}

impl Minibuffer {
    pub fn new(prompt: &str, prefill: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            input: prefill.to_string(),
        }
    }

    /// メッセージ行に表示する内容
    pub fn display_line(&self) -> String {
        format!("{} {}", self.prompt, self.input)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// 印字可能文字を1つ受け取る
    pub fn push_char(&mut self, ch: char) -> PromptResult {
        self.input.push(ch);
        PromptResult::Pending
    }

    /// 末尾1文字を削る
    pub fn erase(&mut self) -> PromptResult {
        self.input.pop();
        PromptResult::Pending
    }

    pub fn accept(&mut self) -> PromptResult {
        PromptResult::Accept(std::mem::take(&mut self.input))
    }

    pub fn cancel(&mut self) -> PromptResult {
        PromptResult::Cancel
    }
}

/// yes/no 確認の1回分の答えを判定する
///
/// `Some(true)` = yes、`Some(false)` = no、`None` = どちらでもない
/// （呼び出し側が聞き直す）。
pub fn parse_yes_or_no(answer: &str) -> Option<bool> {
    if answer.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if answer.eq_ignore_ascii_case("no") {
        Some(false)
    } else {
        None
    }
}

/// goto-line 入力を1始まりの行番号へ解析する
pub fn parse_lineno(input: &str) -> Result<usize> {
    let trimmed = input.trim();
    match trimmed.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(InputError::InvalidArgument {
            arg: format!("Invalid line number: {}", trimmed),
        }
        .into()),
    }
}

/// insert-byte 入力を1バイト値へ解析する
///
/// `0x` 前置で16進、`0` 前置で8進、それ以外は10進。
pub fn parse_byte(input: &str) -> Result<u8> {
    let trimmed = input.trim();
    let parsed = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16)
    } else if trimmed.len() > 1 && trimmed.starts_with('0') {
        u8::from_str_radix(&trimmed[1..], 8)
    } else {
        trimmed.parse::<u8>()
    };
    parsed.map_err(|_| {
        InputError::InvalidArgument {
            arg: format!("Invalid byte value: {}", trimmed),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_typed_characters() {
        let mut mb = Minibuffer::new("Write file:", "");
        mb.push_char('a');
        mb.push_char('b');
        assert_eq!(mb.display_line(), "Write file: ab");
        assert_eq!(mb.accept(), PromptResult::Accept("ab".to_string()));
    }

    #[test]
    fn prefill_can_be_edited() {
        let mut mb = Minibuffer::new("Write file:", "old.txt");
        mb.erase();
        mb.erase();
        mb.erase();
        mb.erase();
        mb.push_char('r');
        mb.push_char('s');
        assert_eq!(mb.input(), "oldrs");
    }

    #[test]
    fn erase_on_empty_input_is_harmless() {
        let mut mb = Minibuffer::new("p", "");
        assert_eq!(mb.erase(), PromptResult::Pending);
        assert_eq!(mb.input(), "");
    }

    #[test]
    fn yes_or_no_is_case_insensitive() {
        assert_eq!(parse_yes_or_no("yes"), Some(true));
        assert_eq!(parse_yes_or_no("YES"), Some(true));
        assert_eq!(parse_yes_or_no("No"), Some(false));
        assert_eq!(parse_yes_or_no("y"), None);
        assert_eq!(parse_yes_or_no(""), None);
    }

    #[test]
    fn lineno_rejects_zero_and_junk() {
        assert_eq!(parse_lineno(" 12 ").unwrap(), 12);
        assert!(parse_lineno("0").is_err());
        assert!(parse_lineno("abc").is_err());
        assert!(parse_lineno("").is_err());
    }

    #[test]
    fn byte_accepts_dec_hex_oct() {
        assert_eq!(parse_byte("65").unwrap(), 65);
        assert_eq!(parse_byte("0x41").unwrap(), 0x41);
        assert_eq!(parse_byte("0101").unwrap(), 0o101);
        assert!(parse_byte("256").is_err());
        assert!(parse_byte("xx").is_err());
    }
}
