//! 通知记录 - 从推送 payload 解码出的类型化消息

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::trace;

use super::extractor::FieldLookup;

/// 记录中已知的 8 个字段（payload `data` 内的 JSON key）
pub const RECORD_KEYS: [&str; 8] = [
    "date",
    "messageBody",
    "mobileNumber",
    "id",
    "title",
    "type",
    "messageTemplate",
    "transactionId",
];

/// 一条解码后的推送消息
///
/// 构造后不可变。每个字段要么是 payload 中对应 key 下的原样字符串，要么缺失；
/// 不会合成或填充默认值。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mobile_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_id: Option<String>,
}

impl NotificationRecord {
    /// 用 8 个字段直接构造
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: impl Into<String>,
        message_body: impl Into<String>,
        mobile_number: impl Into<String>,
        id: impl Into<String>,
        title: impl Into<String>,
        kind: impl Into<String>,
        message_template: impl Into<String>,
        transaction_id: impl Into<String>,
    ) -> Self {
        Self {
            date: Some(date.into()),
            message_body: Some(message_body.into()),
            mobile_number: Some(mobile_number.into()),
            id: Some(id.into()),
            title: Some(title.into()),
            kind: Some(kind.into()),
            message_template: Some(message_template.into()),
            transaction_id: Some(transaction_id.into()),
        }
    }

    /// 从通用 key-value 映射构造
    ///
    /// 已知 key 下的非字符串值视为缺失；未知 key 被忽略。
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let ignored: Vec<&str> = map
            .keys()
            .map(|k| k.as_str())
            .filter(|k| !RECORD_KEYS.contains(k))
            .collect();
        if !ignored.is_empty() {
            trace!(?ignored, "Ignoring unknown record keys");
        }

        let field = |key: &str| FieldLookup::string(map, key).into_option();
        Self {
            date: field("date"),
            message_body: field("messageBody"),
            mobile_number: field("mobileNumber"),
            id: field("id"),
            title: field("title"),
            kind: field("type"),
            message_template: field("messageTemplate"),
            transaction_id: field("transactionId"),
        }
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn message_body(&self) -> Option<&str> {
        self.message_body.as_deref()
    }

    pub fn mobile_number(&self) -> Option<&str> {
        self.mobile_number.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// payload 中的 `type` 字段
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn message_template(&self) -> Option<&str> {
        self.message_template.as_deref()
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    /// 是否所有字段都缺失
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
