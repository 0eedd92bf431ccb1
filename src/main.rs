//! Agent Beep CLI
//!
//! 接收宿主的生命周期事件并按配置响铃 (OpenCode)

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use agent_beep::{
    resolve_event_settings, BeepDispatcher, CommandPlayer, DesktopToast, EventKey, HostEvent,
    SoundPlayer,
};

#[derive(Parser)]
#[command(name = "abeep")]
#[command(about = "Agent Beep - 代理会话事件提示音")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 处理单条宿主事件（JSON 来自参数，缺省读 stdin）
    Event {
        /// 事件 JSON
        payload: Option<String>,
        /// 项目目录（缺省当前目录）
        #[arg(long, short)]
        project: Option<PathBuf>,
    },
    /// 持续处理 stdin 上的 NDJSON 事件流
    Listen {
        /// 项目目录（缺省当前目录）
        #[arg(long, short)]
        project: Option<PathBuf>,
    },
    /// 打印解析后的分层配置
    Config {
        /// 项目目录（缺省当前目录）
        #[arg(long, short)]
        project: Option<PathBuf>,
    },
    /// 播放某个事件类别的提示音（调试配置用）
    TestSound {
        /// 事件类别 (sessionIdle / permissionAsked / questionAsked)
        #[arg(default_value = "sessionIdle")]
        event: String,
        /// 项目目录（缺省当前目录）
        #[arg(long, short)]
        project: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 日志走 stderr，级别由 RUST_LOG 控制
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("agent_beep=info,abeep=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Event { payload, project } => {
            let payload = match payload {
                Some(payload) => payload,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            let mut dispatcher = build_dispatcher(project.as_deref());
            match serde_json::from_str::<HostEvent>(&payload) {
                Ok(event) => dispatcher.handle(event),
                Err(err) => debug!(error = %err, "Ignoring unparseable host event"),
            }
        }
        Commands::Listen { project } => {
            let mut dispatcher = build_dispatcher(project.as_deref());
            info!("Listening for host events on stdin");

            let stdin = BufReader::new(tokio::io::stdin());
            let mut lines = stdin.lines();
            while let Some(line) = lines.next_line().await? {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<HostEvent>(line) {
                    Ok(event) => dispatcher.handle(event),
                    Err(err) => debug!(error = %err, "Ignoring unparseable host event"),
                }
            }
        }
        Commands::Config { project } => {
            let result = agent_beep::load(project.as_deref());
            println!("{}", serde_json::to_string_pretty(&result.to_json())?);
        }
        Commands::TestSound { event, project } => {
            let key: EventKey = event.parse()?;
            let result = agent_beep::load(project.as_deref());
            let settings = resolve_event_settings(&result.config, key);
            if !settings.enabled {
                println!("{} 已禁用", key);
                return Ok(());
            }
            println!("播放 {} (x{})", settings.sound_file, settings.repeat);
            let player = CommandPlayer::detect();
            let outcome = player.play(&settings.sound_file, settings.repeat)?;
            if !outcome.success() {
                eprintln!("播放失败 (exit={}): {}", outcome.exit_code, outcome.stderr);
            }
        }
    }

    Ok(())
}

/// 加载配置并装配分发器
fn build_dispatcher(project: Option<&std::path::Path>) -> BeepDispatcher {
    let result = agent_beep::load(project);
    debug!(
        global = ?result.global_path,
        project = ?result.project_path,
        "Beep config loaded"
    );
    BeepDispatcher::new(
        result.config,
        Arc::new(CommandPlayer::detect()),
        Arc::new(DesktopToast::detect()),
    )
}
