//! 配置合并 - 纯函数，固定顺序：默认值 ← 全局覆盖 ← 项目覆盖
//!
//! 顶层标量是整值替换（覆盖层给出类型正确的值才生效），事件表是逐键、
//! 逐字段的深合并。这一不对称规则是整个配置层最细微的契约，
//! 测试覆盖优先级、隔离性和归一化完备性。

use std::collections::BTreeMap;

use super::model::{BeepConfig, EventConfig, EventKey};
use super::raw::{RawConfig, RawEventOverride};

/// 把一层覆盖合并到 base 上，产出新配置
pub fn merge_config(base: &BeepConfig, raw: &RawConfig) -> BeepConfig {
    let mut merged = base.clone();

    if let Some(enabled) = raw.enabled {
        merged.enabled = enabled;
    }
    if let Some(sound_file) = &raw.sound_file {
        merged.sound_file = sound_file.clone();
    }
    if let Some(repeat) = raw.repeat {
        merged.repeat = repeat;
    }
    if let Some(throttle_ms) = raw.throttle_ms {
        merged.throttle_ms = throttle_ms;
    }
    if let Some(debug_toast) = raw.debug_toast {
        merged.debug_toast = debug_toast;
    }

    for key in EventKey::ALL {
        if let Some(event_override) = raw.events.get(&key) {
            let base_event = merged
                .events
                .get(&key)
                .cloned()
                .unwrap_or_else(EventConfig::enabled_default);
            merged
                .events
                .insert(key, merge_event_config(&base_event, event_override));
        }
    }

    merged
}

/// 合并单个事件项
///
/// 布尔简写只改 `enabled`；对象形式各字段独立覆盖，缺失字段回退 base。
pub fn merge_event_config(base: &EventConfig, ov: &RawEventOverride) -> EventConfig {
    match ov {
        RawEventOverride::Toggle(enabled) => EventConfig {
            enabled: *enabled,
            ..base.clone()
        },
        RawEventOverride::Detailed(detail) => EventConfig {
            enabled: detail.enabled.unwrap_or(base.enabled),
            sound_file: detail.sound_file.clone().or_else(|| base.sound_file.clone()),
            repeat: detail.repeat.or(base.repeat),
            sources: detail.sources.clone().or_else(|| base.sources.clone()),
        },
    }
}

/// 归一化：事件表重建为恰好三个规范化键，每个键的 `enabled` 都是具体值
pub fn normalize_config(config: &BeepConfig) -> BeepConfig {
    let mut events = BTreeMap::new();
    for key in EventKey::ALL {
        let event = config
            .events
            .get(&key)
            .cloned()
            .unwrap_or_else(EventConfig::enabled_default);
        events.insert(key, event);
    }
    BeepConfig {
        events,
        ..config.clone()
    }
}
