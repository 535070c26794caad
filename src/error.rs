//! 错误类型
//!
//! 所有错误都不是致命的：解码失败被吸收为"无记录"，展示失败只记录日志。

use std::path::PathBuf;
use thiserror::Error;

/// 推送子系统错误
#[derive(Debug, Error)]
pub enum PushError {
    /// payload 缺失或格式错误（不会传递给应用回调）
    #[error("payload decode failed: {0}")]
    DecodeFailure(String),

    /// 系统拒绝或未能调度/确认本地通知
    #[error("presentation failed: {0}")]
    PresentationFailure(String),

    /// 用户拒绝通知授权
    #[error("notification permission denied")]
    PermissionDenied,

    /// 配置文件无法读取或解析
    #[error("invalid config at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// 后端订阅请求失败
    #[error("subscription request failed: {0}")]
    Subscription(String),
}

pub type Result<T> = std::result::Result<T, PushError>;
