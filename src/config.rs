//! 配置 - 从 JSON 文件加载，文件不存在时使用默认值

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PushError, Result};
use crate::notification::extractor::DEFAULT_CATEGORY_FALLBACK;
use crate::notification::router::SHOW_MORE_ACTION_IDENTIFIER;
use crate::subscription::SubscriptionConfig;

/// 推送核心配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    /// payload 没有分类标识时使用的占位值
    pub category_fallback: String,
    /// 额外的 "显示更多" 动作标识；`"show"` 始终有效
    pub show_more_action: String,
    /// 后端订阅（可选）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<SubscriptionConfig>,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            category_fallback: DEFAULT_CATEGORY_FALLBACK.to_string(),
            show_more_action: SHOW_MORE_ACTION_IDENTIFIER.to_string(),
            subscription: None,
        }
    }
}

impl PushConfig {
    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("push-relay")
            .join("config.json")
    }

    /// 从默认路径加载
    pub fn load_default() -> Result<Self> {
        Self::load(&Self::default_path())
    }

    /// 从指定路径加载，文件不存在时返回默认配置
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| PushError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| PushError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// 写入配置文件
    pub fn save(&self, path: &Path) -> Result<()> {
        let to_config_error = |message: String| PushError::Config {
            path: path.to_path_buf(),
            message,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| to_config_error(e.to_string()))?;
        }
        let content =
            serde_json::to_string_pretty(self).map_err(|e| to_config_error(e.to_string()))?;
        fs::write(path, content).map_err(|e| to_config_error(e.to_string()))
    }
}
