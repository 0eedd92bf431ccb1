//! 覆盖配置的原始形态 - 逐字段容错提取
//!
//! 单层配置文件解析为 JSON 之后先落到 [`RawConfig`]：每个标量字段要么缺失
//! 要么类型正确（类型不匹配按缺失处理，合并时保留 base 值）；事件项是
//! 布尔开关和对象覆盖的二选一标签联合。提取是显式的逐字段函数，
//! 合并阶段不再做任何形态嗅探。

use serde_json::Value;
use std::collections::BTreeMap;

use super::model::EventKey;

/// 单层覆盖配置
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawConfig {
    pub enabled: Option<bool>,
    pub sound_file: Option<String>,
    pub repeat: Option<f64>,
    pub throttle_ms: Option<f64>,
    pub debug_toast: Option<bool>,
    /// 只包含覆盖层显式出现的规范化键
    pub events: BTreeMap<EventKey, RawEventOverride>,
}

/// 单个事件的覆盖形态
#[derive(Debug, Clone, PartialEq)]
pub enum RawEventOverride {
    /// 布尔简写：只改 `enabled`
    Toggle(bool),
    /// 对象形式：各字段独立覆盖
    Detailed(RawEventConfig),
}

/// 对象形式的事件覆盖
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEventConfig {
    pub enabled: Option<bool>,
    pub sound_file: Option<String>,
    pub repeat: Option<f64>,
    pub sources: Option<Vec<String>>,
}

impl RawConfig {
    /// 从解析后的 JSON 文档提取一层覆盖配置
    ///
    /// 非对象文档返回 `None`。字段级的类型错误不报错：该字段按缺失处理。
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let mut raw = RawConfig {
            enabled: obj.get("enabled").and_then(Value::as_bool),
            sound_file: obj
                .get("soundFile")
                .and_then(Value::as_str)
                .map(str::to_string),
            repeat: obj.get("repeat").and_then(Value::as_f64),
            throttle_ms: obj.get("throttleMs").and_then(Value::as_f64),
            debug_toast: obj.get("debugToast").and_then(Value::as_bool),
            events: BTreeMap::new(),
        };

        if let Some(events) = obj.get("events").and_then(Value::as_object) {
            for key in EventKey::ALL {
                if let Some(entry) = events.get(key.as_str()) {
                    if let Some(event_override) = RawEventOverride::from_value(entry) {
                        raw.events.insert(key, event_override);
                    }
                    // 既非布尔也非对象：等价于保留 base，不记录
                }
            }
        }

        Some(raw)
    }
}

impl RawEventOverride {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(enabled) => Some(RawEventOverride::Toggle(*enabled)),
            Value::Object(obj) => Some(RawEventOverride::Detailed(RawEventConfig {
                enabled: obj.get("enabled").and_then(Value::as_bool),
                sound_file: obj
                    .get("soundFile")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                repeat: obj.get("repeat").and_then(Value::as_f64),
                sources: obj.get("sources").and_then(Value::as_array).map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                }),
            })),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_fields_extracted_when_typed() {
        let raw = RawConfig::from_value(&json!({
            "enabled": false,
            "soundFile": "ding.wav",
            "repeat": 3,
            "throttleMs": 500,
            "debugToast": true,
        }))
        .unwrap();

        assert_eq!(raw.enabled, Some(false));
        assert_eq!(raw.sound_file.as_deref(), Some("ding.wav"));
        assert_eq!(raw.repeat, Some(3.0));
        assert_eq!(raw.throttle_ms, Some(500.0));
        assert_eq!(raw.debug_toast, Some(true));
    }

    #[test]
    fn test_wrong_typed_scalar_becomes_absent() {
        // 类型不匹配逐字段降级，不影响其他字段
        let raw = RawConfig::from_value(&json!({
            "enabled": "yes",
            "soundFile": 42,
            "repeat": "twice",
            "throttleMs": true,
            "debugToast": 1,
        }))
        .unwrap();

        assert_eq!(raw, RawConfig::default());
    }

    #[test]
    fn test_non_object_document_rejected() {
        assert!(RawConfig::from_value(&json!([1, 2, 3])).is_none());
        assert!(RawConfig::from_value(&json!("enabled")).is_none());
        assert!(RawConfig::from_value(&json!(null)).is_none());
    }

    #[test]
    fn test_event_toggle_and_detailed() {
        let raw = RawConfig::from_value(&json!({
            "events": {
                "sessionIdle": false,
                "permissionAsked": {
                    "soundFile": "perm.wav",
                    "repeat": 2,
                    "sources": ["permission.ask", 7, "permission.asked", null],
                },
            }
        }))
        .unwrap();

        assert_eq!(
            raw.events.get(&EventKey::SessionIdle),
            Some(&RawEventOverride::Toggle(false))
        );
        match raw.events.get(&EventKey::PermissionAsked) {
            Some(RawEventOverride::Detailed(cfg)) => {
                assert_eq!(cfg.sound_file.as_deref(), Some("perm.wav"));
                assert_eq!(cfg.repeat, Some(2.0));
                // sources 只保留字符串元素
                assert_eq!(
                    cfg.sources.as_deref(),
                    Some(&["permission.ask".to_string(), "permission.asked".to_string()][..])
                );
            }
            other => panic!("expected detailed override, got {:?}", other),
        }
        assert!(!raw.events.contains_key(&EventKey::QuestionAsked));
    }

    #[test]
    fn test_invalid_event_value_dropped() {
        let raw = RawConfig::from_value(&json!({
            "events": { "sessionIdle": "off", "questionAsked": 0 }
        }))
        .unwrap();
        assert!(raw.events.is_empty());
    }

    #[test]
    fn test_unknown_event_keys_ignored() {
        let raw = RawConfig::from_value(&json!({
            "events": { "agentExited": true }
        }))
        .unwrap();
        assert!(raw.events.is_empty());
    }
}
