//! 注册状态 - 设备 token、服务商 token 和系统注册标志
//!
//! 三者之间没有约束，可能各自缺失或过期。写入方来自两个独立的异步完成路径，
//! 后写覆盖先写。

use std::sync::RwLock;

use serde::Serialize;

/// 注册状态快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationSnapshot {
    pub device_token: Option<String>,
    pub provider_token: Option<String>,
    pub is_registered: bool,
}

/// 进程级注册状态（随服务实例创建和销毁）
#[derive(Debug, Default)]
pub struct RegistrationState {
    inner: RwLock<RegistrationSnapshot>,
}

impl RegistrationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device_token(&self) -> Option<String> {
        self.read().device_token.clone()
    }

    pub fn provider_token(&self) -> Option<String> {
        self.read().provider_token.clone()
    }

    pub fn is_registered(&self) -> bool {
        self.read().is_registered
    }

    /// 系统注册完成时设置设备 token（已编码为十六进制）
    pub fn set_device_token(&self, token: impl Into<String>) {
        self.write().device_token = Some(token.into());
    }

    /// 服务商签发或刷新 token
    pub fn set_provider_token(&self, token: impl Into<String>) {
        self.write().provider_token = Some(token.into());
    }

    pub fn set_registered(&self, registered: bool) {
        self.write().is_registered = registered;
    }

    pub fn snapshot(&self) -> RegistrationSnapshot {
        self.read().clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, RegistrationSnapshot> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, RegistrationSnapshot> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// 设备 token 编码为小写十六进制，每字节两位，无分隔符
pub fn encode_device_token(bytes: &[u8]) -> String {
    hex::encode(bytes)
}
