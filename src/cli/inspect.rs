//! 离线检查 payload：解码、横幅摘要、路由结果
//!
//! payload 可以作为参数、`--file` 文件或 stdin 传入。

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use super::output::format_output;
use crate::notification::extractor::{PayloadExtractor, RawPayload};
use crate::notification::router::{
    EventRouter, InteractionKind, InteractionRoute, LifecycleState, RoutedAction,
    DEFAULT_ACTION_IDENTIFIER,
};
use crate::registration::encode_device_token;

/// payload 输入
#[derive(Args, Debug, Default)]
pub struct PayloadInput {
    /// Payload JSON（省略时读取 --file 或 stdin）
    pub payload: Option<String>,
    /// 从文件读取 payload
    #[arg(long, short)]
    pub file: Option<PathBuf>,
}

impl PayloadInput {
    pub fn read(&self) -> Result<RawPayload> {
        let text = match (&self.payload, &self.file) {
            (Some(inline), _) => inline.clone(),
            (None, Some(path)) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read payload file {}", path.display()))?,
            (None, None) => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read payload from stdin")?;
                buf
            }
        };
        parse_payload(&text)
    }
}

/// 解析 payload 文本，顶层必须是 JSON 对象
pub fn parse_payload(text: &str) -> Result<RawPayload> {
    let value: serde_json::Value =
        serde_json::from_str(text.trim()).context("Payload is not valid JSON")?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => bail!("Payload must be a JSON object, got: {}", other),
    }
}

/// extract 命令参数
#[derive(Args, Debug)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub input: PayloadInput,
    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,
}

pub fn handle_extract(args: &ExtractArgs, extractor: &PayloadExtractor) -> Result<String> {
    let raw = args.input.read()?;
    Ok(render_extract(&raw, extractor, args.json))
}

fn render_extract(raw: &RawPayload, extractor: &PayloadExtractor, json: bool) -> String {
    match extractor.extract(raw) {
        Some(record) => format_output(&record, json),
        None if json => "null".to_string(),
        None => "no notification data".to_string(),
    }
}

/// alert-summary 命令参数
#[derive(Args, Debug)]
pub struct AlertSummaryArgs {
    #[command(flatten)]
    pub input: PayloadInput,
    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,
}

pub fn handle_alert_summary(args: &AlertSummaryArgs, extractor: &PayloadExtractor) -> Result<String> {
    let raw = args.input.read()?;
    Ok(format_output(&extractor.extract_alert_summary(&raw), args.json))
}

/// route 命令参数
#[derive(Args, Debug)]
pub struct RouteArgs {
    #[command(flatten)]
    pub input: PayloadInput,
    /// 应用生命周期状态 (active | background | inactive)
    #[arg(long, short, default_value = "background")]
    pub state: LifecycleState,
    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,
}

/// 投递路由结果报告
#[derive(Debug, Serialize)]
pub struct RouteReport {
    pub timestamp: DateTime<Utc>,
    pub state: LifecycleState,
    pub action: RoutedAction,
}

pub fn handle_route(args: &RouteArgs, router: &EventRouter) -> Result<String> {
    let raw = args.input.read()?;
    let report = route_report(router, args.state, &raw);
    Ok(format_output(&report, args.json))
}

pub fn route_report(router: &EventRouter, state: LifecycleState, raw: &RawPayload) -> RouteReport {
    let record = router.extractor().extract(raw);
    RouteReport {
        timestamp: Utc::now(),
        state,
        action: router.route(state, record, raw),
    }
}

/// interact 命令参数
#[derive(Args, Debug)]
pub struct InteractArgs {
    #[command(flatten)]
    pub input: PayloadInput,
    /// 用户触发的动作标识
    #[arg(long, short, default_value = DEFAULT_ACTION_IDENTIFIER)]
    pub action: String,
    /// 额外的 "显示更多" 动作标识（默认取配置文件中的值，"show" 始终有效）
    #[arg(long)]
    pub show_more_action: Option<String>,
    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,
}

/// 交互路由结果报告
#[derive(Debug, Serialize)]
pub struct InteractionReport {
    pub timestamp: DateTime<Utc>,
    pub action_identifier: String,
    pub route: InteractionRoute,
}

pub fn handle_interact(
    args: &InteractArgs,
    router: &EventRouter,
    show_more_action: &str,
) -> Result<String> {
    let raw = args.input.read()?;
    let show_more_action = args.show_more_action.as_deref().unwrap_or(show_more_action);
    let report = interaction_report(router, &args.action, show_more_action, &raw);
    Ok(format_output(&report, args.json))
}

pub fn interaction_report(
    router: &EventRouter,
    action_identifier: &str,
    show_more_action: &str,
    raw: &RawPayload,
) -> InteractionReport {
    let record = router.extractor().extract(raw);
    let kind = InteractionKind::classify(action_identifier, show_more_action);
    InteractionReport {
        timestamp: Utc::now(),
        action_identifier: action_identifier.to_string(),
        route: router.route_interaction(&kind, record),
    }
}

/// device-token 命令参数
#[derive(Args, Debug)]
pub struct DeviceTokenArgs {
    /// 十六进制设备 token，可带空格和尖括号（如 "<dead beef>"）
    pub token: String,
    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct DeviceTokenReport {
    device_token: String,
    bytes: usize,
}

pub fn handle_device_token(args: &DeviceTokenArgs) -> Result<String> {
    let bytes = decode_device_token(&args.token)?;
    let report = DeviceTokenReport {
        device_token: encode_device_token(&bytes),
        bytes: bytes.len(),
    };
    Ok(format_output(&report, args.json))
}

/// 解析用户输入的十六进制 token
pub fn decode_device_token(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '<' && *c != '>')
        .collect();
    if cleaned.is_empty() {
        return Err(anyhow!("Device token is empty"));
    }
    hex::decode(&cleaned).with_context(|| format!("Invalid hex device token: {}", input))
}
