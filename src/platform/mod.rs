//! 平台协作方接口
//!
//! 推送服务商 SDK、系统远程注册、授权弹窗和通知中心都在进程外，
//! 这里只定义核心依赖的最小接口。实现由宿主应用注入。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PushError;

pub mod memory;

pub use memory::MemoryPlatform;

/// 推送服务商 token 来源
pub trait TokenProvider: Send + Sync {
    /// 当前 token（可能尚未签发）
    fn current_token(&self) -> Option<String>;

    /// 把系统设备 token 交给服务商
    fn set_transport_token(&self, device_token: &[u8]);

    /// 是否自动初始化（签发 token）
    fn set_auto_init_enabled(&self, enabled: bool);
}

/// 系统远程通知注册
pub trait TransportRegistrar: Send + Sync {
    fn register_for_remote_delivery(&self);

    fn is_registered_for_remote_delivery(&self) -> bool;

    fn unregister(&self);
}

/// 授权请求完成回调，参数为是否授权
pub type AuthorizationCompletion = Box<dyn FnOnce(bool) + Send>;

/// 系统通知授权
pub trait Authorizer: Send + Sync {
    /// 异步请求授权，完成后调用 `completion`
    fn request_authorization(
        &self,
        options: AuthorizationOptions,
        completion: AuthorizationCompletion,
    );
}

/// 调度完成回调
pub type ScheduleCompletion = Box<dyn FnOnce(Result<(), PushError>) + Send>;

/// 系统通知中心
pub trait NotificationCenter: Send + Sync {
    /// 调度本地通知。相同 identifier 的待发通知会被替换。
    fn schedule(&self, request: LocalAlertRequest, completion: ScheduleCompletion);

    /// 设置应用角标数字
    fn set_badge_count(&self, count: u32);
}

/// 授权选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationOptions {
    pub alert: bool,
    pub badge: bool,
    pub sound: bool,
}

impl AuthorizationOptions {
    pub fn all() -> Self {
        Self {
            alert: true,
            badge: true,
            sound: true,
        }
    }
}

/// "即将展示" 事件的展示选项
pub type PresentationOptions = AuthorizationOptions;

/// 本地通知提示音（目前只使用系统默认音）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSound {
    #[default]
    Default,
}

/// 本地通知调度请求
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalAlertRequest {
    /// 请求标识（与分类标识相同）
    pub identifier: String,
    pub category_identifier: String,
    pub title: String,
    pub body: String,
    /// 原始 payload，点击后原样带回
    pub user_info: Value,
    pub sound: AlertSound,
    pub delay_secs: u64,
}
