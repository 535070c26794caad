//! 推送通知管理器 - 持有注册状态和应用回调，连接平台协作方
//!
//! 由宿主应用在启动时显式构造，退出时销毁；没有全局单例。
//!
//! # 使用示例
//! ```ignore
//! use push_relay::{PushNotificationManager, MemoryPlatform, LifecycleState};
//! use std::sync::Arc;
//!
//! let manager = PushNotificationManager::builder()
//!     .platform(Arc::new(MemoryPlatform::new()))
//!     .build()?;
//! manager.callbacks().set_on_tap(|record| println!("{:?}", record.title()));
//! manager.handle_push_notification(LifecycleState::Background, &payload);
//! ```

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{debug, info, warn};

use crate::config::PushConfig;
use crate::error::PushError;
use crate::notification::callbacks::AppCallbacks;
use crate::notification::extractor::{PayloadExtractor, RawPayload};
use crate::notification::router::{
    EventRouter, InteractionKind, InteractionRoute, LifecycleState, RoutedAction,
};
use crate::platform::{
    AuthorizationOptions, Authorizer, LocalAlertRequest, NotificationCenter, PresentationOptions,
    TokenProvider, TransportRegistrar,
};
use crate::registration::{encode_device_token, RegistrationSnapshot, RegistrationState};
use crate::subscription::{SubscriptionClient, SubscriptionRequest};

/// 推送通知管理器
pub struct PushNotificationManager {
    state: RegistrationState,
    callbacks: Arc<AppCallbacks>,
    router: EventRouter,
    config: PushConfig,
    subscription: Option<SubscriptionClient>,
    token_provider: Arc<dyn TokenProvider>,
    registrar: Arc<dyn TransportRegistrar>,
    authorizer: Arc<dyn Authorizer>,
    center: Arc<dyn NotificationCenter>,
}

impl PushNotificationManager {
    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::new()
    }

    /// 应用回调槽位
    pub fn callbacks(&self) -> &AppCallbacks {
        &self.callbacks
    }

    pub fn config(&self) -> &PushConfig {
        &self.config
    }

    /// 保存系统下发的设备 token：原样交给服务商，并以十六进制保存
    pub fn set_up_device_token(&self, device_token: &[u8]) -> String {
        self.token_provider.set_transport_token(device_token);
        let encoded = encode_device_token(device_token);
        self.state.set_device_token(encoded.clone());
        info!(device_token = %encoded, "Device token registered");
        encoded
    }

    /// 请求通知授权并注册远程通知（已注册时只开启自动初始化）
    pub fn register_for_push_notifications(&self) {
        self.token_provider.set_auto_init_enabled(true);

        if self.is_registered_for_remote_delivery() {
            debug!("Already registered for remote notifications");
            return;
        }

        let callbacks = self.callbacks.clone();
        self.authorizer.request_authorization(
            AuthorizationOptions::all(),
            Box::new(move |granted: bool| {
                if granted {
                    info!("Notification permission granted");
                    callbacks.permission_allowed();
                } else {
                    info!(reason = %PushError::PermissionDenied, "Notification permission not granted");
                }
            }),
        );

        self.registrar.register_for_remote_delivery();
        self.is_registered_for_remote_delivery();
        self.update_push_token_if_needed();
    }

    /// 从服务商同步当前 token
    pub fn update_push_token_if_needed(&self) {
        if let Some(token) = self.token_provider.current_token() {
            info!(provider_token = %token, "Provider token updated");
            self.state.set_provider_token(token);
        }
    }

    /// 服务商已有 token 时回调，否则什么都不做
    pub fn with_provider_token(&self, complete: impl FnOnce(String)) {
        if let Some(token) = self.token_provider.current_token() {
            complete(token);
        }
    }

    /// 服务商签发或刷新 token
    pub fn on_token_issued_or_refreshed(&self, token: impl Into<String>) {
        let token = token.into();
        info!(provider_token = %token, "Provider token issued or refreshed");
        self.state.set_provider_token(token);
    }

    /// 服务商直接投递的数据消息，只记录
    pub fn on_remote_message(&self, app_data: &RawPayload) {
        let keys: Vec<&str> = app_data.keys().map(|k| k.as_str()).collect();
        debug!(?keys, "Received provider data message");
    }

    /// 处理投递的推送：前台合成本地通知，后台触发点击回调
    pub fn handle_push_notification(&self, state: LifecycleState, raw: &RawPayload) -> RoutedAction {
        let record = self.router.extractor().extract(raw);
        let action = self.router.route(state, record, raw);

        match &action {
            RoutedAction::ScheduleLocalAlert(request) => {
                self.fire_local_alert(request.clone());
            }
            RoutedAction::Deliver(record) => {
                debug!(state = %state, id = ?record.id(), "Delivering notification to tap hook");
                self.callbacks.tap(record);
            }
            RoutedAction::Drop => {
                debug!(state = %state, "No notification data, dropping");
            }
        }

        action
    }

    /// 处理用户对已展示通知的交互
    ///
    /// 先清零角标，再路由；无论结果如何 `completion` 都恰好调用一次。
    pub fn handle_interaction(
        &self,
        action_identifier: &str,
        raw: &RawPayload,
        completion: impl FnOnce(),
    ) -> InteractionRoute {
        self.reset_badge();

        let record = self.router.extractor().extract(raw);
        let kind = InteractionKind::classify(action_identifier, &self.config.show_more_action);
        let route = self.router.route_interaction(&kind, record);

        match &route {
            InteractionRoute::Swipe(record) => {
                debug!(action = %action_identifier, "Default action on notification");
                self.callbacks.swipe(record);
            }
            InteractionRoute::ShowMore(record) => {
                debug!(action = %action_identifier, "Show more action on notification");
                self.callbacks.show_more(record);
            }
            InteractionRoute::Drop => {
                debug!(action = %action_identifier, "Interaction acknowledged without callback");
            }
        }

        completion();
        route
    }

    /// "即将展示" 事件：总是展示横幅、角标和声音
    pub fn will_present(&self, raw: &RawPayload) -> PresentationOptions {
        debug!(category = %self.router.extractor().category_identifier(raw), "Presenting notification");
        PresentationOptions::all()
    }

    /// 合成本地通知。失败只记录日志，不重试。
    pub fn fire_local_alert(&self, request: LocalAlertRequest) {
        let identifier = request.identifier.clone();
        info!(identifier = %identifier, delay_secs = request.delay_secs, "Scheduling local alert");

        self.center.schedule(
            request,
            Box::new(move |result: std::result::Result<(), PushError>| match result {
                Ok(()) => debug!(identifier = %identifier, "Local alert scheduled"),
                Err(e) => warn!(identifier = %identifier, error = %e, "Failed to schedule local alert"),
            }),
        );
    }

    /// 角标清零
    pub fn reset_badge(&self) {
        self.center.set_badge_count(0);
    }

    /// 取消远程通知注册
    pub fn disable_notification(&self) {
        info!("Unregistering from remote notifications");
        self.registrar.unregister();
        self.state.set_registered(false);
    }

    /// 是否已注册远程通知（每次从系统读取并刷新状态）
    pub fn is_registered_for_remote_delivery(&self) -> bool {
        let registered = self.registrar.is_registered_for_remote_delivery();
        self.state.set_registered(registered);
        registered
    }

    pub fn device_token(&self) -> Option<String> {
        self.state.device_token()
    }

    pub fn provider_token(&self) -> Option<String> {
        self.state.provider_token()
    }

    pub fn snapshot(&self) -> RegistrationSnapshot {
        self.state.snapshot()
    }

    /// 构造后端订阅请求
    pub fn subscription_request(&self) -> Option<SubscriptionRequest> {
        let device_id = self
            .config
            .subscription
            .as_ref()
            .and_then(|s| s.device_id.as_deref());
        SubscriptionRequest::from_snapshot(&self.state.snapshot(), device_id)
    }

    /// 上报 token 到后端（未配置后端时跳过）
    pub async fn subscribe_notification(&self) -> crate::error::Result<()> {
        let Some(client) = &self.subscription else {
            debug!("No subscription endpoint configured, skipping");
            return Ok(());
        };

        let request = self.subscription_request().ok_or_else(|| {
            PushError::Subscription("no device token or device id available".to_string())
        })?;

        client.subscribe(&request).await
    }

    /// 从后端取消订阅（未配置后端时跳过）
    pub async fn unsubscribe_notification(&self) -> crate::error::Result<()> {
        match &self.subscription {
            Some(client) => client.unsubscribe().await,
            None => {
                debug!("No subscription endpoint configured, skipping");
                Ok(())
            }
        }
    }
}

/// 管理器构建器
#[derive(Default)]
pub struct ManagerBuilder {
    config: PushConfig,
    token_provider: Option<Arc<dyn TokenProvider>>,
    registrar: Option<Arc<dyn TransportRegistrar>>,
    authorizer: Option<Arc<dyn Authorizer>>,
    center: Option<Arc<dyn NotificationCenter>>,
}

impl ManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: PushConfig) -> Self {
        self.config = config;
        self
    }

    pub fn token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    pub fn registrar(mut self, registrar: Arc<dyn TransportRegistrar>) -> Self {
        self.registrar = Some(registrar);
        self
    }

    pub fn authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    pub fn notification_center(mut self, center: Arc<dyn NotificationCenter>) -> Self {
        self.center = Some(center);
        self
    }

    /// 一个对象同时提供四个平台接口
    pub fn platform<P>(self, platform: Arc<P>) -> Self
    where
        P: TokenProvider + TransportRegistrar + Authorizer + NotificationCenter + 'static,
    {
        self.token_provider(platform.clone())
            .registrar(platform.clone())
            .authorizer(platform.clone())
            .notification_center(platform)
    }

    /// 构建管理器，并从平台同步初始 token 和注册状态
    pub fn build(self) -> Result<PushNotificationManager> {
        let token_provider = self
            .token_provider
            .ok_or_else(|| anyhow!("token provider is required"))?;
        let registrar = self
            .registrar
            .ok_or_else(|| anyhow!("transport registrar is required"))?;
        let authorizer = self
            .authorizer
            .ok_or_else(|| anyhow!("authorizer is required"))?;
        let center = self
            .center
            .ok_or_else(|| anyhow!("notification center is required"))?;

        let subscription = match &self.config.subscription {
            Some(config) => Some(SubscriptionClient::new(config.clone())?),
            None => None,
        };

        let extractor =
            PayloadExtractor::new().with_category_fallback(self.config.category_fallback.clone());

        let manager = PushNotificationManager {
            state: RegistrationState::new(),
            callbacks: Arc::new(AppCallbacks::new()),
            router: EventRouter::new(extractor),
            config: self.config,
            subscription,
            token_provider,
            registrar,
            authorizer,
            center,
        };

        manager.update_push_token_if_needed();
        manager.is_registered_for_remote_delivery();
        Ok(manager)
    }
}
