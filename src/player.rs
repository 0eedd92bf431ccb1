//! 声音播放 - 外部播放器命令的封装
//!
//! 核心只依赖 [`SoundPlayer`] trait；[`CommandPlayer`] 在启动时探测
//! 平台播放器（Windows 走 powershell 的 `Media.SoundPlayer`，macOS 用
//! afplay，Linux 优先 paplay）。非零退出码由调用方按播放失败上报，
//! 这里不重试。

use anyhow::{Context, Result};
use std::process::Command;
use tracing::debug;

/// 一次播放的结果
#[derive(Debug, Clone)]
pub struct PlayOutcome {
    pub exit_code: i32,
    pub stderr: String,
}

impl PlayOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// 声音播放协作方
pub trait SoundPlayer: Send + Sync {
    /// 播放器名称，日志用
    fn name(&self) -> &str;

    /// 同步播放 `repeat` 次
    fn play(&self, sound_file: &str, repeat: u32) -> Result<PlayOutcome>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayerKind {
    /// powershell 脚本内嵌重复循环
    PowerShell,
    /// 每次重复单独运行一次播放命令
    Direct,
}

/// 平台播放器
pub struct CommandPlayer {
    program: String,
    kind: PlayerKind,
}

impl CommandPlayer {
    /// 启动时按平台探测播放器命令
    pub fn detect() -> Self {
        if cfg!(target_os = "windows") {
            Self {
                program: locate(&["powershell"]),
                kind: PlayerKind::PowerShell,
            }
        } else if cfg!(target_os = "macos") {
            Self {
                program: locate(&["afplay"]),
                kind: PlayerKind::Direct,
            }
        } else {
            Self {
                program: locate(&["paplay", "aplay"]),
                kind: PlayerKind::Direct,
            }
        }
    }
}

/// 依次探测候选命令的绝对路径，全部失败时退回首个名称
fn locate(candidates: &[&str]) -> String {
    for candidate in candidates {
        if let Ok(path) = which::which(candidate) {
            return path.to_string_lossy().into_owned();
        }
    }
    candidates[0].to_string()
}

/// powershell 单引号转义：`'` → `''`
fn escape_single_quotes(path: &str) -> String {
    path.replace('\'', "''")
}

/// 生成 powershell 播放脚本
fn build_powershell_script(sound_file: &str, repeat: u32) -> String {
    let escaped = escape_single_quotes(sound_file);
    if repeat == 1 {
        format!("(New-Object Media.SoundPlayer '{}').PlaySync()", escaped)
    } else {
        format!(
            "1..{} | ForEach-Object {{ (New-Object Media.SoundPlayer '{}').PlaySync() }}",
            repeat, escaped
        )
    }
}

fn outcome_of(output: std::process::Output) -> PlayOutcome {
    PlayOutcome {
        exit_code: output.status.code().unwrap_or(-1),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

impl SoundPlayer for CommandPlayer {
    fn name(&self) -> &str {
        &self.program
    }

    fn play(&self, sound_file: &str, repeat: u32) -> Result<PlayOutcome> {
        debug!(player = %self.program, sound_file, repeat, "Playing sound");
        match self.kind {
            PlayerKind::PowerShell => {
                let script = build_powershell_script(sound_file, repeat);
                let output = Command::new(&self.program)
                    .args(["-NoProfile", "-Command", &script])
                    .output()
                    .with_context(|| format!("failed to run {}", self.program))?;
                Ok(outcome_of(output))
            }
            PlayerKind::Direct => {
                let mut last = PlayOutcome {
                    exit_code: 0,
                    stderr: String::new(),
                };
                for _ in 0..repeat {
                    let output = Command::new(&self.program)
                        .arg(sound_file)
                        .output()
                        .with_context(|| format!("failed to run {}", self.program))?;
                    last = outcome_of(output);
                    if !last.success() {
                        break;
                    }
                }
                Ok(last)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_single_quotes() {
        assert_eq!(escape_single_quotes("plain.wav"), "plain.wav");
        assert_eq!(escape_single_quotes("it's.wav"), "it''s.wav");
    }

    #[test]
    fn test_powershell_script_single_play() {
        let script = build_powershell_script("C:\\Media\\ding.wav", 1);
        assert_eq!(
            script,
            "(New-Object Media.SoundPlayer 'C:\\Media\\ding.wav').PlaySync()"
        );
    }

    #[test]
    fn test_powershell_script_repeats_in_loop() {
        let script = build_powershell_script("ding.wav", 3);
        assert!(script.starts_with("1..3 | ForEach-Object"));
        assert!(script.contains("'ding.wav'"));
    }

    #[test]
    fn test_locate_falls_back_to_first_candidate() {
        let program = locate(&["definitely-not-a-real-player-binary"]);
        assert_eq!(program, "definitely-not-a-real-player-binary");
    }

    #[test]
    fn test_outcome_success() {
        let outcome = PlayOutcome {
            exit_code: 0,
            stderr: String::new(),
        };
        assert!(outcome.success());
        let outcome = PlayOutcome {
            exit_code: 2,
            stderr: "no device".to_string(),
        };
        assert!(!outcome.success());
    }
}
