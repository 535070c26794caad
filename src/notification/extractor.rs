//! Payload 解码模块 - 把系统投递的无类型 payload 解码为 `NotificationRecord`
//!
//! 约定的 payload 格式：
//! ```json
//! {
//!   "aps": { "alert": { "title": "Sys", "body": "Banner" } },
//!   "google.c.a.c_l": "category",
//!   "data": "{\"title\":\"Hi\",\"messageBody\":\"Hello\"}"
//! }
//! ```
//!
//! `data` 的值本身是一段 JSON 字符串。解码从不失败：任何格式问题都表现为
//! "没有记录"，而不是部分或损坏的记录。

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::record::NotificationRecord;
use crate::error::{PushError, Result};

/// 系统投递的原始 payload
pub type RawPayload = Map<String, Value>;

/// 携带应用数据的 key
pub const DATA_KEY: &str = "data";

/// 推送服务商写入分类标识的 key
pub const CATEGORY_KEY: &str = "google.c.a.c_l";

/// 没有分类标识时使用的占位值
pub const DEFAULT_CATEGORY_FALLBACK: &str = "No Category Identifier founded";

/// 单个字段的查找结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldLookup {
    Present(String),
    Missing,
    /// key 存在但值不是字符串
    Mistyped,
}

impl FieldLookup {
    /// 在映射中查找字符串字段
    pub fn string(map: &Map<String, Value>, key: &str) -> Self {
        match map.get(key) {
            None => FieldLookup::Missing,
            Some(Value::String(s)) => FieldLookup::Present(s.clone()),
            Some(other) => {
                trace!(key = %key, value = %other, "Ignoring non-string field");
                FieldLookup::Mistyped
            }
        }
    }

    pub fn into_option(self) -> Option<String> {
        match self {
            FieldLookup::Present(s) => Some(s),
            FieldLookup::Missing | FieldLookup::Mistyped => None,
        }
    }
}

/// 系统横幅内容 `aps.alert.{title,body}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertSummary {
    pub title: String,
    pub body: String,
}

impl AlertSummary {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Payload 解码器
#[derive(Debug, Clone)]
pub struct PayloadExtractor {
    category_fallback: String,
}

impl PayloadExtractor {
    pub fn new() -> Self {
        Self {
            category_fallback: DEFAULT_CATEGORY_FALLBACK.to_string(),
        }
    }

    /// 设置分类标识缺失时的占位值
    pub fn with_category_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.category_fallback = fallback.into();
        self
    }

    /// 解码 `data` 字段为通知记录
    ///
    /// 以下情况返回 `None`：
    /// - 没有 `data`，或 `data` 不是字符串
    /// - `data` 不是合法 JSON
    /// - `data` 解析出的 JSON 不是对象
    pub fn extract(&self, raw: &RawPayload) -> Option<NotificationRecord> {
        match self.decode(raw) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(reason = %e, "No notification record in payload");
                None
            }
        }
    }

    /// 与 `extract` 相同，但保留失败原因 (`PushError::DecodeFailure`)
    pub fn decode(&self, raw: &RawPayload) -> Result<NotificationRecord> {
        let json_string = match FieldLookup::string(raw, DATA_KEY) {
            FieldLookup::Present(s) => s,
            FieldLookup::Missing => {
                return Err(PushError::DecodeFailure("payload has no data field".to_string()))
            }
            FieldLookup::Mistyped => {
                return Err(PushError::DecodeFailure(
                    "payload data field is not a string".to_string(),
                ))
            }
        };

        let parsed: Value = serde_json::from_str(&json_string).map_err(|e| {
            PushError::DecodeFailure(format!("payload data is not valid JSON: {}", e))
        })?;

        match parsed {
            Value::Object(map) => Ok(NotificationRecord::from_map(&map)),
            other => Err(PushError::DecodeFailure(format!(
                "payload data is not a JSON object: {}",
                other
            ))),
        }
    }

    /// 提取系统横幅标题和正文，任何一层缺失或类型不对都返回空字符串
    pub fn extract_alert_summary(&self, raw: &RawPayload) -> AlertSummary {
        let alert = raw
            .get("aps")
            .and_then(|aps| aps.as_object())
            .and_then(|aps| aps.get("alert"))
            .and_then(|alert| alert.as_object());

        let Some(alert) = alert else {
            return AlertSummary::default();
        };

        AlertSummary {
            title: FieldLookup::string(alert, "title")
                .into_option()
                .unwrap_or_default(),
            body: FieldLookup::string(alert, "body")
                .into_option()
                .unwrap_or_default(),
        }
    }

    /// 读取推送服务商的分类标识
    pub fn category_identifier(&self, raw: &RawPayload) -> String {
        FieldLookup::string(raw, CATEGORY_KEY)
            .into_option()
            .unwrap_or_else(|| self.category_fallback.clone())
    }
}

impl Default for PayloadExtractor {
    fn default() -> Self {
        Self::new()
    }
}
