//! 内存平台 - 记录所有调用，用于 dry-run 和测试

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use tracing::debug;

use super::{
    AuthorizationCompletion, AuthorizationOptions, Authorizer, LocalAlertRequest,
    NotificationCenter, ScheduleCompletion, TokenProvider, TransportRegistrar,
};
use crate::error::PushError;

/// 同时实现四个平台接口的内存实现
#[derive(Default)]
pub struct MemoryPlatform {
    provider_token: Mutex<Option<String>>,
    transport_token: Mutex<Option<Vec<u8>>>,
    auto_init: AtomicBool,
    registered: AtomicBool,
    register_calls: AtomicUsize,
    unregister_calls: AtomicUsize,
    grant: AtomicBool,
    authorization_requests: Mutex<Vec<AuthorizationOptions>>,
    /// 授权回答延后到 `resolve_authorizations` 时才给出
    deferred: AtomicBool,
    pending_authorizations: Mutex<VecDeque<AuthorizationCompletion>>,
    pending_alerts: Mutex<Vec<LocalAlertRequest>>,
    schedule_history: Mutex<Vec<LocalAlertRequest>>,
    schedule_error: Mutex<Option<String>>,
    badge: Mutex<Option<u32>>,
    badge_sets: AtomicUsize,
}

impl MemoryPlatform {
    /// 默认：没有 token，未注册，授权请求会被同意
    pub fn new() -> Self {
        let platform = Self::default();
        platform.grant.store(true, Ordering::SeqCst);
        platform
    }

    pub fn with_provider_token(self, token: impl Into<String>) -> Self {
        *lock(&self.provider_token) = Some(token.into());
        self
    }

    /// 设置授权请求的回答
    pub fn with_grant(self, granted: bool) -> Self {
        self.grant.store(granted, Ordering::SeqCst);
        self
    }

    pub fn with_registered(self, registered: bool) -> Self {
        self.registered.store(registered, Ordering::SeqCst);
        self
    }

    /// 授权回答延后，直到调用 `resolve_authorizations`
    pub fn with_deferred_authorization(self) -> Self {
        self.deferred.store(true, Ordering::SeqCst);
        self
    }

    /// 之后的调度请求都以该错误失败
    pub fn fail_schedule(&self, message: impl Into<String>) {
        *lock(&self.schedule_error) = Some(message.into());
    }

    /// 模拟服务商签发新 token
    pub fn issue_provider_token(&self, token: impl Into<String>) {
        *lock(&self.provider_token) = Some(token.into());
    }

    /// 给出所有延后的授权回答，返回处理数量
    pub fn resolve_authorizations(&self) -> usize {
        let granted = self.grant.load(Ordering::SeqCst);
        let pending: Vec<_> = lock(&self.pending_authorizations).drain(..).collect();
        let count = pending.len();
        for completion in pending {
            completion(granted);
        }
        count
    }

    pub fn transport_token(&self) -> Option<Vec<u8>> {
        lock(&self.transport_token).clone()
    }

    pub fn auto_init_enabled(&self) -> bool {
        self.auto_init.load(Ordering::SeqCst)
    }

    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn unregister_calls(&self) -> usize {
        self.unregister_calls.load(Ordering::SeqCst)
    }

    pub fn authorization_requests(&self) -> Vec<AuthorizationOptions> {
        lock(&self.authorization_requests).clone()
    }

    /// 当前待发的本地通知（相同 identifier 已被替换）
    pub fn pending_alerts(&self) -> Vec<LocalAlertRequest> {
        lock(&self.pending_alerts).clone()
    }

    /// 所有调度请求（包括失败的）
    pub fn schedule_history(&self) -> Vec<LocalAlertRequest> {
        lock(&self.schedule_history).clone()
    }

    pub fn badge(&self) -> Option<u32> {
        *lock(&self.badge)
    }

    pub fn badge_sets(&self) -> usize {
        self.badge_sets.load(Ordering::SeqCst)
    }
}

impl TokenProvider for MemoryPlatform {
    fn current_token(&self) -> Option<String> {
        lock(&self.provider_token).clone()
    }

    fn set_transport_token(&self, device_token: &[u8]) {
        *lock(&self.transport_token) = Some(device_token.to_vec());
    }

    fn set_auto_init_enabled(&self, enabled: bool) {
        self.auto_init.store(enabled, Ordering::SeqCst);
    }
}

impl TransportRegistrar for MemoryPlatform {
    fn register_for_remote_delivery(&self) {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        self.registered.store(true, Ordering::SeqCst);
    }

    fn is_registered_for_remote_delivery(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }

    fn unregister(&self) {
        self.unregister_calls.fetch_add(1, Ordering::SeqCst);
        self.registered.store(false, Ordering::SeqCst);
    }
}

impl Authorizer for MemoryPlatform {
    fn request_authorization(
        &self,
        options: AuthorizationOptions,
        completion: AuthorizationCompletion,
    ) {
        lock(&self.authorization_requests).push(options);
        if self.deferred.load(Ordering::SeqCst) {
            lock(&self.pending_authorizations).push_back(completion);
        } else {
            completion(self.grant.load(Ordering::SeqCst));
        }
    }
}

impl NotificationCenter for MemoryPlatform {
    fn schedule(&self, request: LocalAlertRequest, completion: ScheduleCompletion) {
        lock(&self.schedule_history).push(request.clone());

        if let Some(message) = lock(&self.schedule_error).clone() {
            completion(Err(PushError::PresentationFailure(message)));
            return;
        }

        debug!(identifier = %request.identifier, delay_secs = request.delay_secs, "Local alert pending");
        {
            let mut pending = lock(&self.pending_alerts);
            pending.retain(|r| r.identifier != request.identifier);
            pending.push(request);
        }
        completion(Ok(()));
    }

    fn set_badge_count(&self, count: u32) {
        self.badge_sets.fetch_add(1, Ordering::SeqCst);
        *lock(&self.badge) = Some(count);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::AlertSound;
    use std::sync::Arc;

    fn request(identifier: &str, title: &str) -> LocalAlertRequest {
        LocalAlertRequest {
            identifier: identifier.to_string(),
            category_identifier: identifier.to_string(),
            title: title.to_string(),
            body: String::new(),
            user_info: serde_json::json!({}),
            sound: AlertSound::Default,
            delay_secs: 5,
        }
    }

    #[test]
    fn test_schedule_replaces_same_identifier() {
        let platform = MemoryPlatform::new();
        platform.schedule(request("a", "first"), Box::new(|r: Result<(), PushError>| assert!(r.is_ok())));
        platform.schedule(request("a", "second"), Box::new(|r: Result<(), PushError>| assert!(r.is_ok())));
        platform.schedule(request("b", "other"), Box::new(|r: Result<(), PushError>| assert!(r.is_ok())));

        let pending = platform.pending_alerts();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].title, "second");
        assert_eq!(platform.schedule_history().len(), 3);
    }

    #[test]
    fn test_schedule_failure_reported() {
        let platform = MemoryPlatform::new();
        platform.fail_schedule("not allowed");

        let failed = Arc::new(AtomicBool::new(false));
        let flag = failed.clone();
        platform.schedule(
            request("a", "t"),
            Box::new(move |r: Result<(), PushError>| {
                flag.store(matches!(r, Err(PushError::PresentationFailure(_))), Ordering::SeqCst);
            }),
        );

        assert!(failed.load(Ordering::SeqCst));
        assert!(platform.pending_alerts().is_empty());
    }

    #[test]
    fn test_deferred_authorization() {
        let platform = MemoryPlatform::new().with_deferred_authorization();
        let answer = Arc::new(Mutex::new(None));
        let sink = answer.clone();
        platform.request_authorization(
            AuthorizationOptions::all(),
            Box::new(move |granted: bool| *sink.lock().unwrap() = Some(granted)),
        );

        assert_eq!(*answer.lock().unwrap(), None);
        assert_eq!(platform.resolve_authorizations(), 1);
        assert_eq!(*answer.lock().unwrap(), Some(true));
    }

    #[test]
    fn test_register_and_unregister() {
        let platform = MemoryPlatform::new();
        assert!(!platform.is_registered_for_remote_delivery());
        platform.register_for_remote_delivery();
        assert!(platform.is_registered_for_remote_delivery());
        platform.unregister();
        assert!(!platform.is_registered_for_remote_delivery());
        assert_eq!(platform.register_calls(), 1);
        assert_eq!(platform.unregister_calls(), 1);
    }
}
