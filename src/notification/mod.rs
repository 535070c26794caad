//! 通知 payload 模型与分发策略
//!
//! # 流程
//! 1. `PayloadExtractor` 把无类型 payload 解码为 `NotificationRecord`（或没有记录）
//! 2. `EventRouter` 按生命周期状态/交互类型决定唯一的结果
//! 3. `AppCallbacks` 保存应用注册的回调
//!
//! # 使用示例
//! ```ignore
//! use push_relay::notification::{EventRouter, LifecycleState};
//!
//! let router = EventRouter::default();
//! let record = router.extractor().extract(&raw);
//! let action = router.route(LifecycleState::Background, record, &raw);
//! ```

pub mod callbacks;
pub mod extractor;
pub mod record;
pub mod router;

pub use callbacks::AppCallbacks;
pub use extractor::{AlertSummary, FieldLookup, PayloadExtractor, RawPayload};
pub use record::NotificationRecord;
pub use router::{
    EventRouter, InteractionKind, InteractionRoute, LifecycleState, RoutedAction,
    LOCAL_ALERT_DELAY_SECS,
};
