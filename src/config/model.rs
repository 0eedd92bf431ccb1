//! 配置模型 - beep 配置的 schema 和内置默认值
//!
//! 配置来自两层文件（全局 + 项目），合并逻辑见 [`crate::config::merge`]。
//! `repeat` / `throttle_ms` 保留原始数值，取整和钳制分别发生在
//! 事件解析（[`crate::beep::resolver`]）和限流门（[`crate::beep::throttle`]）。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 默认重复次数
pub const DEFAULT_REPEAT: u32 = 1;
/// 默认限流窗口（毫秒）
pub const DEFAULT_THROTTLE_MS: f64 = 2000.0;

/// 平台默认提示音路径
pub fn default_sound_file() -> String {
    if cfg!(target_os = "windows") {
        "C:\\Windows\\Media\\Windows Notify.wav".to_string()
    } else if cfg!(target_os = "macos") {
        "/System/Library/Sounds/Glass.aiff".to_string()
    } else {
        "/usr/share/sounds/freedesktop/stereo/complete.oga".to_string()
    }
}

/// 规范化事件类别
///
/// 配置文件和诊断输出里使用 camelCase 名称（`sessionIdle` 等）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKey {
    /// 会话从 busy/retry 转入 idle
    SessionIdle,
    /// 权限确认提示
    PermissionAsked,
    /// 问题提示
    QuestionAsked,
}

impl EventKey {
    /// 全部规范化类别，归一化后 `events` 表恰好包含这三个键
    pub const ALL: [EventKey; 3] = [
        EventKey::SessionIdle,
        EventKey::PermissionAsked,
        EventKey::QuestionAsked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKey::SessionIdle => "sessionIdle",
            EventKey::PermissionAsked => "permissionAsked",
            EventKey::QuestionAsked => "questionAsked",
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sessionIdle" => Ok(EventKey::SessionIdle),
            "permissionAsked" => Ok(EventKey::PermissionAsked),
            "questionAsked" => Ok(EventKey::QuestionAsked),
            other => Err(anyhow::anyhow!("unknown event key: {}", other)),
        }
    }
}

/// 单个事件的配置
///
/// 归一化之后 `enabled` 一定是具体值；`sound_file` / `repeat` 缺失时
/// 在解析阶段回退到顶层配置，`sources` 缺失表示不过滤来源。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<f64>,
    /// 来源白名单：存在时只有命中的来源标签才会触发
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}

impl EventConfig {
    /// 事件的默认配置（启用，全部回退到顶层）
    pub fn enabled_default() -> Self {
        Self {
            enabled: true,
            sound_file: None,
            repeat: None,
            sources: None,
        }
    }
}

/// beep 总配置
///
/// 启动时由两层文件合并产出，之后只读（无热加载）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeepConfig {
    pub enabled: bool,
    pub sound_file: String,
    pub repeat: f64,
    pub throttle_ms: f64,
    pub debug_toast: bool,
    pub events: BTreeMap<EventKey, EventConfig>,
}

impl Default for BeepConfig {
    fn default() -> Self {
        let mut events = BTreeMap::new();
        for key in EventKey::ALL {
            events.insert(key, EventConfig::enabled_default());
        }
        Self {
            enabled: true,
            sound_file: default_sound_file(),
            repeat: f64::from(DEFAULT_REPEAT),
            throttle_ms: DEFAULT_THROTTLE_MS,
            debug_toast: false,
            events,
        }
    }
}
