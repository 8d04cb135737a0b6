//! エディタ設定
//!
//! JSON形式の設定ファイルを読み込む。ファイルが無い場合はデフォルト値で動作する。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// エディタ全体の設定
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// タブストップ幅（表示・インデント共通）
    pub tab_width: usize,
    /// キルリングの最大保持数
    pub kill_ring_capacity: usize,
    /// 描画リトライの上限（折り返し過多なバッファ対策）
    pub render_retry_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: 8,
            kill_ring_capacity: 32,
            render_retry_limit: 8,
        }
    }
}

impl EditorConfig {
    /// 設定ファイルの探索パス
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("temacs").join("config.json"))
    }

    /// デフォルトパスから設定を読み込む
    ///
    /// ファイルが存在しない・壊れている場合はデフォルト値に落とす。
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// 指定パスから設定を読み込む
    pub fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(err) => {
                    log::warn!("invalid config {}: {}", path.display(), err);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = EditorConfig::load_from(std::path::Path::new("/nonexistent/config.json"));
        assert_eq!(config.tab_width, 8);
        assert_eq!(config.kill_ring_capacity, 32);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"tab_width": 4}"#).expect("write");

        let config = EditorConfig::load_from(&path);
        assert_eq!(config.tab_width, 4);
        assert_eq!(config.kill_ring_capacity, 32);
    }

    #[test]
    fn malformed_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").expect("write");

        let config = EditorConfig::load_from(&path);
        assert_eq!(config.render_retry_limit, 8);
    }
}
