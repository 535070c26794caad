//! 后端订阅客户端
//!
//! 把设备 token 和服务商 token 上报给应用后端，或取消订阅。

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{PushError, Result};
use crate::registration::RegistrationSnapshot;

/// 订阅客户端配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// 后端基础 URL (如 https://api.example.com/push)
    pub endpoint: String,
    /// Bearer token（可选）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// 没有设备 token 时上报的设备 ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// 超时时间 (秒)
    pub timeout_secs: u64,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            auth_token: None,
            device_id: None,
            timeout_secs: 30,
        }
    }
}

/// 订阅请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    pub device_token: String,
    pub fcm_token: String,
}

impl SubscriptionRequest {
    /// 从注册状态构造；设备 token 缺失时使用 `device_id`，两者都没有返回 `None`
    pub fn from_snapshot(snapshot: &RegistrationSnapshot, device_id: Option<&str>) -> Option<Self> {
        let device_token = snapshot
            .device_token
            .clone()
            .or_else(|| device_id.map(|s| s.to_string()))?;

        Some(Self {
            device_token,
            fcm_token: snapshot.provider_token.clone().unwrap_or_default(),
        })
    }
}

/// 订阅客户端
#[derive(Debug)]
pub struct SubscriptionClient {
    client: Client,
    config: SubscriptionConfig,
}

impl SubscriptionClient {
    pub fn new(config: SubscriptionConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(PushError::Subscription("endpoint is required".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PushError::Subscription(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SubscriptionConfig {
        &self.config
    }

    /// 订阅地址
    pub fn subscribe_url(&self) -> String {
        format!("{}/subscribe", self.config.endpoint.trim_end_matches('/'))
    }

    /// 上报 token
    pub async fn subscribe(&self, request: &SubscriptionRequest) -> Result<()> {
        let response = self
            .authorized(self.client.post(self.subscribe_url()))
            .json(request)
            .send()
            .await
            .map_err(|e| PushError::Subscription(format!("HTTP request failed: {}", e)))?;

        Self::check_status(response.status(), "subscribe")?;
        info!(endpoint = %self.config.endpoint, "Subscribed for notifications");
        Ok(())
    }

    /// 取消订阅
    pub async fn unsubscribe(&self) -> Result<()> {
        let response = self
            .authorized(self.client.delete(self.subscribe_url()))
            .send()
            .await
            .map_err(|e| PushError::Subscription(format!("HTTP request failed: {}", e)))?;

        Self::check_status(response.status(), "unsubscribe")?;
        info!(endpoint = %self.config.endpoint, "Unsubscribed from notifications");
        Ok(())
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth_token {
            Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
            None => builder,
        }
    }

    fn check_status(status: reqwest::StatusCode, operation: &str) -> Result<()> {
        if status.is_success() {
            Ok(())
        } else {
            warn!(operation = %operation, status = %status, "Subscription request rejected");
            Err(PushError::Subscription(format!("{} returned {}", operation, status)))
        }
    }
}
