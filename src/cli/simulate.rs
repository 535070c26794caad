//! 用内存平台完整走一遍管理器流程，以及后端订阅命令

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use tracing::info;

use super::inspect::{decode_device_token, PayloadInput};
use super::output::format_output;
use crate::config::PushConfig;
use crate::manager::PushNotificationManager;
use crate::notification::extractor::RawPayload;
use crate::notification::record::NotificationRecord;
use crate::notification::router::LifecycleState;
use crate::platform::{LocalAlertRequest, MemoryPlatform};

/// simulate 命令参数
#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub input: PayloadInput,
    /// 应用生命周期状态 (active | background | inactive)
    #[arg(long, short, default_value = "background")]
    pub state: LifecycleState,
    /// 模拟用户交互（动作标识），不传则模拟投递
    #[arg(long, short)]
    pub action: Option<String>,
    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,
}

/// 模拟结果
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub timestamp: DateTime<Utc>,
    pub outcome: serde_json::Value,
    pub fired_hooks: Vec<String>,
    pub pending_alerts: Vec<LocalAlertRequest>,
    pub badge: Option<u32>,
    /// 交互是否已确认（仅交互模拟）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledged: Option<bool>,
}

/// 加载配置：指定路径或默认路径
pub fn load_config(path: Option<&PathBuf>) -> Result<PushConfig> {
    let config = match path {
        Some(path) => PushConfig::load(path)?,
        None => PushConfig::load_default()?,
    };
    Ok(config)
}

pub fn handle_simulate(args: &SimulateArgs, config: PushConfig) -> Result<String> {
    let raw = args.input.read()?;
    let report = simulate(config, args.state, args.action.as_deref(), &raw)?;
    Ok(format_output(&report, args.json))
}

/// 在内存平台上执行一次投递或交互
pub fn simulate(
    config: PushConfig,
    state: LifecycleState,
    action: Option<&str>,
    raw: &RawPayload,
) -> Result<SimulationReport> {
    // 模拟不访问后端
    let config = PushConfig {
        subscription: None,
        ..config
    };
    let platform = Arc::new(MemoryPlatform::new());
    let manager = PushNotificationManager::builder()
        .config(config)
        .platform(platform.clone())
        .build()?;

    let fired = Arc::new(Mutex::new(Vec::new()));
    manager.callbacks().set_on_tap(record_hook(&fired, "tap"));
    manager.callbacks().set_on_swipe(record_hook(&fired, "swipe"));
    manager.callbacks().set_on_show_more(record_hook(&fired, "show_more"));

    let (outcome, acknowledged) = match action {
        Some(action) => {
            let mut acknowledged = false;
            let route = manager.handle_interaction(action, raw, || acknowledged = true);
            (serde_json::to_value(route)?, Some(acknowledged))
        }
        None => {
            let routed = manager.handle_push_notification(state, raw);
            (serde_json::to_value(routed)?, None)
        }
    };

    let fired_hooks = fired.lock().unwrap_or_else(|e| e.into_inner()).clone();
    Ok(SimulationReport {
        timestamp: Utc::now(),
        outcome,
        fired_hooks,
        pending_alerts: platform.pending_alerts(),
        badge: platform.badge(),
        acknowledged,
    })
}

/// 记录被触发的回调名称
fn record_hook(
    sink: &Arc<Mutex<Vec<String>>>,
    name: &'static str,
) -> impl Fn(&NotificationRecord) + Send + Sync + 'static {
    let sink = sink.clone();
    move |_: &NotificationRecord| {
        sink.lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(name.to_string());
    }
}

/// subscribe 命令参数
#[derive(Args, Debug)]
pub struct SubscribeArgs {
    /// 十六进制设备 token
    #[arg(long)]
    pub device_token: Option<String>,
    /// 服务商 token
    #[arg(long)]
    pub fcm_token: Option<String>,
    /// 取消订阅
    #[arg(long)]
    pub unsubscribe: bool,
}

pub async fn handle_subscribe(args: SubscribeArgs, config: PushConfig) -> Result<String> {
    if config.subscription.is_none() {
        bail!("No subscription endpoint configured (set \"subscription.endpoint\" in the config file)");
    }

    let platform = match &args.fcm_token {
        Some(token) => MemoryPlatform::new().with_provider_token(token.clone()),
        None => MemoryPlatform::new(),
    };
    let manager = PushNotificationManager::builder()
        .config(config)
        .platform(Arc::new(platform))
        .build()?;

    if let Some(token) = &args.device_token {
        manager.set_up_device_token(&decode_device_token(token)?);
    }

    if args.unsubscribe {
        manager.unsubscribe_notification().await?;
        info!("Unsubscribe request sent");
        Ok("unsubscribed".to_string())
    } else {
        manager.subscribe_notification().await?;
        info!("Subscribe request sent");
        Ok("subscribed".to_string())
    }
}
