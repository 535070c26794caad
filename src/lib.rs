//! Push Relay - 推送通知 payload 解码、路由与设备注册

pub mod cli;
pub mod config;
pub mod error;
pub mod manager;
pub mod notification;
pub mod platform;
pub mod registration;
pub mod subscription;

pub use config::PushConfig;
pub use error::PushError;
pub use manager::{ManagerBuilder, PushNotificationManager};
pub use notification::{
    AlertSummary, AppCallbacks, EventRouter, InteractionKind, InteractionRoute, LifecycleState,
    NotificationRecord, PayloadExtractor, RawPayload, RoutedAction,
};
pub use platform::{
    AuthorizationOptions, Authorizer, LocalAlertRequest, MemoryPlatform, NotificationCenter,
    PresentationOptions, TokenProvider, TransportRegistrar,
};
pub use registration::{encode_device_token, RegistrationSnapshot, RegistrationState};
pub use subscription::{SubscriptionClient, SubscriptionConfig, SubscriptionRequest};
