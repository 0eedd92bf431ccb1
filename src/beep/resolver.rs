//! 事件设置解析 - 把归一化配置落成单次触发的具体参数
//!
//! 回退链：音频文件 事件级 → 顶层（顶层值出厂即内置默认）；重复次数
//! 事件级 → 顶层 → 1。`max(1, floor(v))` 只作用于最终解析值。

use crate::config::model::{BeepConfig, EventConfig, EventKey, DEFAULT_REPEAT};

/// 单个事件解析后的触发参数
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub enabled: bool,
    pub sound_file: String,
    pub repeat: u32,
    /// 存在时作为来源白名单
    pub sources: Option<Vec<String>>,
}

/// 解析某个事件类别的触发参数
pub fn resolve_event_settings(config: &BeepConfig, key: EventKey) -> ResolvedSettings {
    let event = config
        .events
        .get(&key)
        .cloned()
        .unwrap_or_else(EventConfig::enabled_default);

    let sound_file = event
        .sound_file
        .unwrap_or_else(|| config.sound_file.clone());
    let repeat = normalize_repeat(
        event.repeat,
        normalize_repeat(Some(config.repeat), DEFAULT_REPEAT),
    );

    ResolvedSettings {
        enabled: event.enabled,
        sound_file,
        repeat,
        sources: event.sources,
    }
}

/// 重复次数归一化：有限数取整，其余用回退值，下限恒为 1
pub fn normalize_repeat(value: Option<f64>, fallback: u32) -> u32 {
    let floored = match value {
        Some(v) if v.is_finite() => v.floor(),
        _ => f64::from(fallback),
    };
    if floored < 1.0 {
        1
    } else if floored >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        floored as u32
    }
}
