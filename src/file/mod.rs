//! ファイル入出力
//!
//! バイト列のままの読み込みと、パスの展開・表示名の決定。
//! 保存はバッファエンジン側の原子的な書き出しに任せる。

use crate::error::{FileError, Result};
use std::path::{Path, PathBuf};

/// 読み込んだファイル
#[derive(Debug)]
pub struct LoadedFile {
    pub bytes: Vec<u8>,
    pub path: PathBuf,
    pub display_name: String,
    /// まだ存在しないファイルを開いた
    pub is_new: bool,
}

/// チルダを展開して `PathBuf` にする
pub fn expand_path(input: &str) -> Result<PathBuf> {
    if input.is_empty() {
        return Err(FileError::InvalidPath {
            path: input.to_string(),
        }
        .into());
    }
    let expanded = shellexpand::tilde(input);
    Ok(PathBuf::from(expanded.as_ref()))
}

/// ステータス行に出す名前。ファイル名部分だけを使う。
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// ファイルをバイト列のまま読む
///
/// 存在しないパスは空バッファの新規ファイルとして開く。UTF-8として
/// 不正な内容もそのまま保持される。
pub fn load(input: &str) -> Result<LoadedFile> {
    let path = expand_path(input)?;
    match std::fs::read(&path) {
        Ok(bytes) => Ok(LoadedFile {
            display_name: display_name(&path),
            path,
            bytes,
            is_new: false,
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(LoadedFile {
            display_name: display_name(&path),
            path,
            bytes: Vec::new(),
            is_new: true,
        }),
        Err(err) => Err(FileError::Io {
            message: format!("{}: {}", path.display(), err),
        }
        .into()),
    }
}
