//! ロギングシステム
//!
//! 開発者向けの詳細ログ出力基盤。TUI動作中はstderrが使えないため、
//! `log` ファサードの出力をファイルへ書き出す。

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// ファイル出力ロガー
///
/// `log` クレートのバックエンドとして動作し、各レコードを
/// `LEVEL target: message` 形式で追記する。
pub struct FileLogger {
    path: PathBuf,
    file: Mutex<Option<std::fs::File>>,
}

impl FileLogger {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            file: Mutex::new(None),
        }
    }

    fn write_line(&self, line: &str) {
        let mut guard = match self.file.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };

        if guard.is_none() {
            *guard = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .ok();
        }

        if let Some(file) = guard.as_mut() {
            let _ = writeln!(file, "{}", line);
        }
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.write_line(&format!(
            "{} {}: {}",
            record.level(),
            record.target(),
            record.args()
        ));
    }

    fn flush(&self) {}
}

/// ログ出力先のデフォルトパス
fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("temacs.log")
}

/// ロガーを初期化
///
/// 二重初期化は無視する（テストから複数回呼ばれても安全）。
pub fn init() {
    init_with_path(default_log_path());
}

/// 出力先を指定してロガーを初期化
pub fn init_with_path(path: PathBuf) {
    let logger = Box::new(FileLogger::new(path));
    if log::set_boxed_logger(logger).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logger_writes_records_to_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("test.log");
        let logger = FileLogger::new(path.clone());

        logger.write_line("DEBUG test: hello");
        logger.write_line("INFO test: world");

        let content = std::fs::read_to_string(&path).expect("log file");
        assert!(content.contains("hello"));
        assert!(content.contains("world"));
    }
}
