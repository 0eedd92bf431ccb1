//! 分发器 - 事件分类、边沿判定、门控与副作用触发
//!
//! 每条宿主事件先归类到规范化事件类别。两条空闲信号（状态变化和专用
//! 空闲事件）都收敛到同一条边沿规则：只有 busy/retry → idle 触发提醒，
//! 且两条路径都要回写跟踪器保持一致。通知路径的门控顺序固定：
//! 总开关 → 事件开关 → 来源白名单 → 限流门。任何失败都降级为
//! 「不响铃 + 诊断」，不影响后续事件。

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::model::{BeepConfig, EventKey};
use crate::player::SoundPlayer;
use crate::toast::{DebugToast, Severity};

use super::event::{source, BeepDetails, HostEvent};
use super::resolver::resolve_event_settings;
use super::session::{SessionStatus, SessionStatusTracker};
use super::throttle::BeepThrottle;

/// beep 分发器
///
/// 持有归一化配置和全部可变状态（会话跟踪、限流槽），
/// 两个副作用协作方以 trait 对象注入。
pub struct BeepDispatcher {
    config: BeepConfig,
    sessions: SessionStatusTracker,
    throttle: BeepThrottle,
    player: Arc<dyn SoundPlayer>,
    toast: Arc<dyn DebugToast>,
}

impl BeepDispatcher {
    pub fn new(
        config: BeepConfig,
        player: Arc<dyn SoundPlayer>,
        toast: Arc<dyn DebugToast>,
    ) -> Self {
        Self {
            config,
            sessions: SessionStatusTracker::new(),
            throttle: BeepThrottle::new(),
            player,
            toast,
        }
    }

    pub fn config(&self) -> &BeepConfig {
        &self.config
    }

    /// 处理一条宿主事件
    ///
    /// 缺少会话 ID 或状态标签的记录视为不可处理，静默忽略。
    pub fn handle(&mut self, event: HostEvent) {
        match event {
            HostEvent::SessionStatus { properties } => {
                let Some(session_id) = non_empty(properties.session_id) else {
                    return;
                };
                let Some(tag) = properties
                    .status
                    .and_then(|status| status.kind)
                    .filter(|tag| !tag.is_empty())
                else {
                    return;
                };
                let status = SessionStatus::parse(&tag);
                let prev = self.sessions.record_status(&session_id, status);
                if status == SessionStatus::Idle && prev.is_working() {
                    self.beep(
                        EventKey::SessionIdle,
                        BeepDetails::new(source::SESSION_STATUS)
                            .with_session_id(Some(session_id))
                            .with_prev(prev),
                    );
                }
            }
            HostEvent::SessionIdle { properties } => {
                let Some(session_id) = non_empty(properties.session_id) else {
                    return;
                };
                let prev = self.sessions.last_status(&session_id);
                if prev.is_working() {
                    self.beep(
                        EventKey::SessionIdle,
                        BeepDetails::new(source::SESSION_IDLE)
                            .with_session_id(Some(session_id.clone()))
                            .with_prev(prev),
                    );
                }
                // 边沿判定之后回写，确保两条空闲路径状态一致
                self.sessions.set_idle(&session_id);
            }
            HostEvent::PermissionAsked { properties } => {
                self.beep(
                    EventKey::PermissionAsked,
                    BeepDetails::new(source::PERMISSION_ASKED)
                        .with_session_id(properties.session_id),
                );
            }
            HostEvent::QuestionAsked { properties } => {
                self.beep(
                    EventKey::QuestionAsked,
                    BeepDetails::new(source::QUESTION_ASKED).with_session_id(properties.session_id),
                );
            }
            HostEvent::PermissionAsk {
                session_id,
                permission,
                status,
            } => {
                if status.as_deref() != Some("ask") {
                    return;
                }
                self.beep(
                    EventKey::PermissionAsked,
                    BeepDetails::new(source::PERMISSION_ASK)
                        .with_session_id(session_id)
                        .with_permission(permission),
                );
            }
            HostEvent::ToolExecuteBefore { tool, session_id } => {
                if tool.as_deref() != Some("question") {
                    return;
                }
                self.beep(
                    EventKey::QuestionAsked,
                    BeepDetails::new(source::QUESTION_TOOL).with_session_id(session_id),
                );
            }
            HostEvent::Unknown => {
                debug!("Ignoring unhandled host event type");
            }
        }
    }

    /// 通知路径：开关 → 白名单 → 限流 → 播放
    fn beep(&mut self, key: EventKey, details: BeepDetails) {
        if !self.config.enabled {
            return;
        }
        let settings = resolve_event_settings(&self.config, key);
        if !settings.enabled {
            return;
        }
        if let Some(sources) = &settings.sources {
            if !sources.iter().any(|allowed| allowed == details.source) {
                debug!(event = %key, source = details.source, "Beep skipped by source filter");
                return;
            }
        }

        let decision = self.throttle.try_fire(self.config.throttle_ms);
        if !decision.allowed {
            self.debug_toast(
                &format!(
                    "beep throttled ({}ms): {}{}",
                    decision.remaining_ms, key, details
                ),
                Severity::Warning,
            );
            return;
        }

        let sound_label = file_name(&settings.sound_file);
        self.debug_toast(
            &format!(
                "beep: {} ({}, x{}){}",
                key, sound_label, settings.repeat, details
            ),
            Severity::Info,
        );

        match self.player.play(&settings.sound_file, settings.repeat) {
            Ok(outcome) => {
                if !outcome.success() {
                    warn!(
                        exit_code = outcome.exit_code,
                        stderr = %outcome.stderr,
                        "beep playback failed"
                    );
                    self.debug_toast(
                        &format!("beep failed (exit={})", outcome.exit_code),
                        Severity::Error,
                    );
                }
            }
            Err(err) => {
                warn!(error = %err, "beep playback failed");
                self.debug_toast(&format!("beep failed: {}", err), Severity::Error);
            }
        }
    }

    /// 尽力而为的调试提示，失败只记日志
    fn debug_toast(&self, message: &str, severity: Severity) {
        if !self.config.debug_toast {
            return;
        }
        if let Err(err) = self.toast.show(message, severity) {
            warn!(error = %err, "beep debug toast failed");
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}
