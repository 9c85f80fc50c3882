use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const SESSION_FILE_VERSION: u32 = 1;

/// 会话文件数据模型
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionFile {
    pub version: u32,
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
    #[serde(default)]
    pub last_updated: Option<String>, // RFC 3339
}

impl Default for SessionFile {
    fn default() -> Self {
        Self {
            version: SESSION_FILE_VERSION,
            entries: BTreeMap::new(),
            last_updated: None,
        }
    }
}
