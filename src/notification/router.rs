//! 事件路由 - 决定每个通知事件触发哪一个结果
//!
//! 两条独立规则：
//! 1. 投递时：前台 -> 调度本地通知；后台/未激活 -> 点击回调；无记录 -> 丢弃
//! 2. 用户交互时：默认动作 -> swipe 回调；"show" -> show-more 回调；其它 -> 丢弃
//!
//! 路由不持有状态，每个事件求值一次。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::extractor::{PayloadExtractor, RawPayload};
use super::record::NotificationRecord;
use crate::platform::{AlertSound, LocalAlertRequest};

/// 本地通知展示前的固定延迟（秒）
pub const LOCAL_ALERT_DELAY_SECS: u64 = 5;

/// 系统默认动作标识（用户点击通知本身）
pub const DEFAULT_ACTION_IDENTIFIER: &str = "com.apple.UNNotificationDefaultActionIdentifier";

/// 系统关闭动作标识
pub const DISMISS_ACTION_IDENTIFIER: &str = "com.apple.UNNotificationDismissActionIdentifier";

/// "显示更多" 按钮的动作标识
pub const SHOW_MORE_ACTION_IDENTIFIER: &str = "show";

/// 应用生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Active,
    Background,
    Inactive,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Active => "active",
            LifecycleState::Background => "background",
            LifecycleState::Inactive => "inactive",
        }
    }
}

impl std::str::FromStr for LifecycleState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(LifecycleState::Active),
            "background" => Ok(LifecycleState::Background),
            "inactive" => Ok(LifecycleState::Inactive),
            other => Err(format!("unknown lifecycle state: {}", other)),
        }
    }
}

/// 投递时的路由结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RoutedAction {
    /// 前台：合成本地通知
    ScheduleLocalAlert(LocalAlertRequest),
    /// 后台/未激活：触发点击回调
    Deliver(NotificationRecord),
    /// 无记录：什么都不做
    Drop,
}

/// 用户交互类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionKind {
    DefaultActivation,
    ShowMoreAction,
    Dismiss,
    Other(String),
}

impl InteractionKind {
    /// 按系统动作标识分类
    pub fn from_identifier(identifier: &str) -> Self {
        Self::classify(identifier, SHOW_MORE_ACTION_IDENTIFIER)
    }

    /// 按系统动作标识分类，`show_more_alias` 是额外的 "显示更多" 标识
    ///
    /// `"show"` 总是 "显示更多"；别名不能覆盖系统默认动作和关闭动作。
    pub fn classify(identifier: &str, show_more_alias: &str) -> Self {
        if identifier == DEFAULT_ACTION_IDENTIFIER {
            InteractionKind::DefaultActivation
        } else if identifier == DISMISS_ACTION_IDENTIFIER {
            InteractionKind::Dismiss
        } else if identifier == SHOW_MORE_ACTION_IDENTIFIER || identifier == show_more_alias {
            InteractionKind::ShowMoreAction
        } else {
            InteractionKind::Other(identifier.to_string())
        }
    }
}

/// 交互时的路由结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InteractionRoute {
    Swipe(NotificationRecord),
    ShowMore(NotificationRecord),
    Drop,
}

/// 事件路由器
#[derive(Debug, Clone, Default)]
pub struct EventRouter {
    extractor: PayloadExtractor,
}

impl EventRouter {
    pub fn new(extractor: PayloadExtractor) -> Self {
        Self { extractor }
    }

    pub fn extractor(&self) -> &PayloadExtractor {
        &self.extractor
    }

    /// 投递时路由
    pub fn route(
        &self,
        state: LifecycleState,
        record: Option<NotificationRecord>,
        raw: &RawPayload,
    ) -> RoutedAction {
        match (state, record) {
            (LifecycleState::Active, _) => {
                RoutedAction::ScheduleLocalAlert(self.local_alert_request(raw))
            }
            (_, Some(record)) => RoutedAction::Deliver(record),
            (_, None) => RoutedAction::Drop,
        }
    }

    /// 用户交互路由
    pub fn route_interaction(
        &self,
        kind: &InteractionKind,
        record: Option<NotificationRecord>,
    ) -> InteractionRoute {
        let Some(record) = record else {
            return InteractionRoute::Drop;
        };

        match kind {
            InteractionKind::DefaultActivation => InteractionRoute::Swipe(record),
            InteractionKind::ShowMoreAction => InteractionRoute::ShowMore(record),
            InteractionKind::Dismiss | InteractionKind::Other(_) => InteractionRoute::Drop,
        }
    }

    /// 用 payload 中的系统横幅内容构造本地通知
    pub fn local_alert_request(&self, raw: &RawPayload) -> LocalAlertRequest {
        let summary = self.extractor.extract_alert_summary(raw);
        let identifier = self.extractor.category_identifier(raw);

        LocalAlertRequest {
            identifier: identifier.clone(),
            category_identifier: identifier,
            title: summary.title,
            body: summary.body,
            user_info: Value::Object(raw.clone()),
            sound: AlertSound::Default,
            delay_secs: LOCAL_ALERT_DELAY_SECS,
        }
    }
}
