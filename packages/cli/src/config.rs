use scribe_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "scribe.config.json";

/// Scribe configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory `convert` walks when no path is given
    #[serde(default = "default_src_dir")]
    pub src_dir: String,

    /// Where converted files are written
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Indent html and json output
    #[serde(default)]
    pub pretty: bool,

    /// Session settings used when documents are loaded through the editor
    #[serde(default)]
    pub editor: EditorConfig,
}

fn default_src_dir() -> String {
    ".".to_string()
}

fn default_out_dir() -> String {
    "dist".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn src_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.src_dir)
    }

    pub fn out_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.out_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            out_dir: default_out_dir(),
            pretty: false,
            editor: EditorConfig::default(),
        }
    }
}
