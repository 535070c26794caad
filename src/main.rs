//! Push Relay CLI
//!
//! 离线检查推送 payload 的解码与路由结果，并向后端上报 token

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use push_relay::cli::{
    handle_alert_summary, handle_device_token, handle_extract, handle_interact, handle_route,
    handle_simulate, handle_subscribe, load_config, AlertSummaryArgs, DeviceTokenArgs, ExtractArgs,
    InteractArgs, RouteArgs, SimulateArgs, SubscribeArgs,
};
use push_relay::{EventRouter, PayloadExtractor};

#[derive(Parser)]
#[command(name = "push-relay")]
#[command(about = "Push Relay - 推送通知 payload 解码与路由")]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认 ~/.config/push-relay/config.json）
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 解码 payload 中的 data 字段
    Extract(ExtractArgs),
    /// 提取系统横幅标题和正文
    AlertSummary(AlertSummaryArgs),
    /// 计算投递时的路由结果
    Route(RouteArgs),
    /// 计算用户交互的路由结果
    Interact(InteractArgs),
    /// 规范化十六进制设备 token
    DeviceToken(DeviceTokenArgs),
    /// 在内存平台上模拟完整处理流程
    Simulate(SimulateArgs),
    /// 向后端上报或取消 token 订阅
    Subscribe(SubscribeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("push_relay=info,push-relay=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    debug!(?config, "Loaded config");

    let extractor = PayloadExtractor::new().with_category_fallback(config.category_fallback.clone());
    let router = EventRouter::new(extractor.clone());

    let output = match cli.command {
        Commands::Extract(args) => handle_extract(&args, &extractor)?,
        Commands::AlertSummary(args) => handle_alert_summary(&args, &extractor)?,
        Commands::Route(args) => handle_route(&args, &router)?,
        Commands::Interact(args) => handle_interact(&args, &router, &config.show_more_action)?,
        Commands::DeviceToken(args) => handle_device_token(&args)?,
        Commands::Simulate(args) => handle_simulate(&args, config)?,
        Commands::Subscribe(args) => handle_subscribe(args, config).await?,
    };

    println!("{}", output);
    Ok(())
}
