//! 调试提示 - 尽力而为的桌面通知
//!
//! 只在配置开了 `debugToast` 时被调用。发送失败由调用方记日志后吞掉，
//! 不影响声音路径。

use anyhow::{bail, Context, Result};
use std::process::Command;

/// 提示时长（毫秒）
const TOAST_DURATION_MS: u32 = 3000;

/// 提示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// 调试提示协作方
pub trait DebugToast: Send + Sync {
    fn show(&self, message: &str, severity: Severity) -> Result<()>;
}

enum ToastBackend {
    /// Linux: notify-send
    NotifySend(String),
    /// macOS: osascript display notification
    OsaScript(String),
    /// 兜底：stderr
    Stderr,
}

/// 桌面提示
pub struct DesktopToast {
    backend: ToastBackend,
}

impl DesktopToast {
    /// 启动时探测可用的通知命令，找不到就退回 stderr 输出
    pub fn detect() -> Self {
        let backend = if cfg!(target_os = "macos") {
            match which::which("osascript") {
                Ok(path) => ToastBackend::OsaScript(path.to_string_lossy().into_owned()),
                Err(_) => ToastBackend::Stderr,
            }
        } else {
            match which::which("notify-send") {
                Ok(path) => ToastBackend::NotifySend(path.to_string_lossy().into_owned()),
                Err(_) => ToastBackend::Stderr,
            }
        };
        Self { backend }
    }
}

impl DebugToast for DesktopToast {
    fn show(&self, message: &str, severity: Severity) -> Result<()> {
        match &self.backend {
            ToastBackend::NotifySend(program) => {
                let urgency = match severity {
                    Severity::Error => "critical",
                    _ => "normal",
                };
                let duration = TOAST_DURATION_MS.to_string();
                let output = Command::new(program)
                    .args([
                        "-a",
                        "beep",
                        "-u",
                        urgency,
                        "-t",
                        duration.as_str(),
                        "beep",
                        message,
                    ])
                    .output()
                    .context("failed to run notify-send")?;
                if !output.status.success() {
                    bail!(
                        "notify-send exited with {}",
                        output.status.code().unwrap_or(-1)
                    );
                }
                Ok(())
            }
            ToastBackend::OsaScript(program) => {
                let script = format!(
                    "display notification \"{}\" with title \"beep\"",
                    escape_osascript(message)
                );
                let output = Command::new(program)
                    .args(["-e", &script])
                    .output()
                    .context("failed to run osascript")?;
                if !output.status.success() {
                    bail!(
                        "osascript exited with {}",
                        output.status.code().unwrap_or(-1)
                    );
                }
                Ok(())
            }
            ToastBackend::Stderr => {
                eprintln!("[beep:{}] {}", severity.as_str(), message);
                Ok(())
            }
        }
    }
}

fn escape_osascript(message: &str) -> String {
    message.replace('\\', "\\\\").replace('"', "\\\"")
}
