//! 分发流程集成测试 - 从宿主事件到协作方调用的端到端行为

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use serde_json::json;

use agent_beep::{
    BeepConfig, BeepDispatcher, BeepThrottle, DebugToast, HostEvent, PlayOutcome, Severity,
    SoundPlayer,
};

struct RecordingPlayer {
    plays: Mutex<Vec<(String, u32)>>,
}

impl RecordingPlayer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            plays: Mutex::new(Vec::new()),
        })
    }

    fn plays(&self) -> Vec<(String, u32)> {
        self.plays.lock().unwrap().clone()
    }
}

impl SoundPlayer for RecordingPlayer {
    fn name(&self) -> &str {
        "recording"
    }

    fn play(&self, sound_file: &str, repeat: u32) -> Result<PlayOutcome> {
        self.plays
            .lock()
            .unwrap()
            .push((sound_file.to_string(), repeat));
        Ok(PlayOutcome {
            exit_code: 0,
            stderr: String::new(),
        })
    }
}

struct RecordingToast {
    messages: Mutex<Vec<(String, Severity)>>,
}

impl RecordingToast {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            messages: Mutex::new(Vec::new()),
        })
    }

    fn messages(&self) -> Vec<(String, Severity)> {
        self.messages.lock().unwrap().clone()
    }
}

impl DebugToast for RecordingToast {
    fn show(&self, message: &str, severity: Severity) -> Result<()> {
        self.messages
            .lock()
            .unwrap()
            .push((message.to_string(), severity));
        Ok(())
    }
}

fn event(value: serde_json::Value) -> HostEvent {
    serde_json::from_value(value).expect("valid host event")
}

fn config_from(value: serde_json::Value) -> BeepConfig {
    let raw = agent_beep::config::RawConfig::from_value(&value).expect("object config");
    agent_beep::config::normalize_config(&agent_beep::config::merge_config(
        &BeepConfig::default(),
        &raw,
    ))
}

#[test]
fn test_default_config_busy_then_idle_fires_once_with_prev_busy() {
    let player = RecordingPlayer::new();
    let toast = RecordingToast::new();
    let config = config_from(json!({ "throttleMs": 0, "debugToast": true }));
    let default_sound = config.sound_file.clone();
    let mut dispatcher = BeepDispatcher::new(config, player.clone(), toast.clone());
    assert!(dispatcher.config().enabled);

    dispatcher.handle(event(json!({
        "type": "session.status",
        "properties": { "sessionID": "s1", "status": { "type": "busy" } },
    })));
    dispatcher.handle(event(json!({
        "type": "session.status",
        "properties": { "sessionID": "s1", "status": { "type": "idle" } },
    })));

    assert_eq!(player.plays(), vec![(default_sound, 1)]);

    let messages = toast.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].0.starts_with("beep: sessionIdle"));
    assert!(messages[0].0.contains("prev=busy"));
    assert!(messages[0].0.contains("sessionId=s1"));
}

#[test]
fn test_project_override_disables_question_but_not_permission() {
    let player = RecordingPlayer::new();
    let config = config_from(json!({
        "throttleMs": 0,
        "events": { "questionAsked": false },
    }));
    let mut dispatcher = BeepDispatcher::new(config, player.clone(), RecordingToast::new());

    dispatcher.handle(event(json!({
        "type": "tool.execute.before", "tool": "question", "sessionID": "s1",
    })));
    assert!(player.plays().is_empty());

    dispatcher.handle(event(json!({
        "type": "permission.ask", "sessionID": "s1", "status": "ask",
    })));
    assert_eq!(player.plays().len(), 1);
}

#[test]
fn test_throttle_remaining_after_ten_millis() {
    let mut throttle = BeepThrottle::new();
    let start = Instant::now();

    let first = throttle.try_fire_at(2000.0, start);
    assert!(first.allowed);

    let second = throttle.try_fire_at(2000.0, start + Duration::from_millis(10));
    assert!(!second.allowed);
    assert_eq!(second.remaining_ms, 1990);
}

#[test]
fn test_burst_of_mixed_events_lets_only_first_through() {
    let player = RecordingPlayer::new();
    let config = config_from(json!({ "throttleMs": 60000 }));
    let mut dispatcher = BeepDispatcher::new(config, player.clone(), RecordingToast::new());

    dispatcher.handle(event(json!({
        "type": "session.status",
        "properties": { "sessionID": "s1", "status": { "type": "busy" } },
    })));
    dispatcher.handle(event(json!({
        "type": "session.status",
        "properties": { "sessionID": "s1", "status": { "type": "idle" } },
    })));
    dispatcher.handle(event(json!({
        "type": "permission.ask", "sessionID": "s2", "status": "ask",
    })));
    dispatcher.handle(event(json!({
        "type": "tool.execute.before", "tool": "question", "sessionID": "s3",
    })));

    // 全局单槽：窗口内只有第一条通过
    assert_eq!(player.plays().len(), 1);
}

#[test]
fn test_source_filter_blocks_other_source_even_when_unthrottled() {
    let player = RecordingPlayer::new();
    let config = config_from(json!({
        "throttleMs": 0,
        "events": { "questionAsked": { "sources": ["question tool"] } },
    }));
    let mut dispatcher = BeepDispatcher::new(config, player.clone(), RecordingToast::new());

    dispatcher.handle(event(json!({
        "type": "question.asked", "properties": { "sessionID": "s1" },
    })));
    assert!(player.plays().is_empty());

    dispatcher.handle(event(json!({
        "type": "tool.execute.before", "tool": "question", "sessionID": "s1",
    })));
    assert_eq!(player.plays().len(), 1);
}

#[test]
fn test_unknown_event_types_are_ignored() {
    let player = RecordingPlayer::new();
    let config = config_from(json!({ "throttleMs": 0 }));
    let mut dispatcher = BeepDispatcher::new(config, player.clone(), RecordingToast::new());

    dispatcher.handle(event(json!({ "type": "session.compacted", "properties": {} })));
    dispatcher.handle(event(json!({ "type": "message.updated" })));

    assert!(player.plays().is_empty());
}
