//! Index and logging locations from TOML (`[index]`, `[logging]` sections)

use serde::{Deserialize, Serialize};

/// `[index]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileIndexConfig {
    /// Directory for collection snapshots; in-memory only when unset
    pub data_dir: Option<String>,
}

/// `[logging]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL conversation event log; disabled when unset
    pub conversation_log: Option<String>,
}
