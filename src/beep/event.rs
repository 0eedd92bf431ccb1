//! 宿主事件的线上格式和诊断明细
//!
//! 宿主以 JSON 记录投递生命周期事件，`type` 字段区分种类。两个 hook
//! （权限决策、工具调用前）也走同一信封。缺字段不报错：解析成
//! `Option`，由分发器判定是否可处理。

use serde::Deserialize;
use std::fmt;

use super::session::SessionStatus;

/// 来源标签 - 标识触发通知的底层信号，供事件级白名单过滤
pub mod source {
    pub const SESSION_STATUS: &str = "session.status";
    pub const SESSION_IDLE: &str = "session.idle";
    pub const PERMISSION_ASKED: &str = "permission.asked";
    pub const QUESTION_ASKED: &str = "question.asked";
    pub const PERMISSION_ASK: &str = "permission.ask";
    pub const QUESTION_TOOL: &str = "question tool";
}

/// 宿主事件记录
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum HostEvent {
    /// 会话状态变化
    #[serde(rename = "session.status")]
    SessionStatus {
        #[serde(default)]
        properties: StatusProperties,
    },
    /// 专用空闲事件
    #[serde(rename = "session.idle")]
    SessionIdle {
        #[serde(default)]
        properties: SessionProperties,
    },
    /// 权限提示事件
    #[serde(rename = "permission.asked")]
    PermissionAsked {
        #[serde(default)]
        properties: SessionProperties,
    },
    /// 问题提示事件
    #[serde(rename = "question.asked")]
    QuestionAsked {
        #[serde(default)]
        properties: SessionProperties,
    },
    /// 权限决策 hook，只在 status == "ask" 时生效
    #[serde(rename = "permission.ask")]
    PermissionAsk {
        #[serde(rename = "sessionID")]
        session_id: Option<String>,
        permission: Option<String>,
        status: Option<String>,
    },
    /// 工具调用前 hook，只关心 question 工具
    #[serde(rename = "tool.execute.before")]
    ToolExecuteBefore {
        tool: Option<String>,
        #[serde(rename = "sessionID")]
        session_id: Option<String>,
    },
    /// 其他事件类型，一律忽略
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusProperties {
    #[serde(rename = "sessionID")]
    pub session_id: Option<String>,
    pub status: Option<StatusBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusBody {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionProperties {
    #[serde(rename = "sessionID")]
    pub session_id: Option<String>,
}

/// 一次通知尝试的诊断明细
///
/// `Display` 产出 ` (source=…, sessionId=…, prev=…)` 形式，缺失字段省略，
/// 用于限流和触发的调试提示。
#[derive(Debug, Clone)]
pub struct BeepDetails {
    pub source: &'static str,
    pub session_id: Option<String>,
    pub prev: Option<SessionStatus>,
    pub permission: Option<String>,
}

impl BeepDetails {
    pub fn new(source: &'static str) -> Self {
        Self {
            source,
            session_id: None,
            prev: None,
            permission: None,
        }
    }

    pub fn with_session_id(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn with_prev(mut self, prev: SessionStatus) -> Self {
        self.prev = Some(prev);
        self
    }

    pub fn with_permission(mut self, permission: Option<String>) -> Self {
        self.permission = permission;
        self
    }
}

impl fmt::Display for BeepDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec![format!("source={}", self.source)];
        if let Some(session_id) = &self.session_id {
            parts.push(format!("sessionId={}", session_id));
        }
        if let Some(prev) = &self.prev {
            parts.push(format!("prev={}", prev));
        }
        if let Some(permission) = &self.permission {
            parts.push(format!("permission={}", permission));
        }
        write!(f, " ({})", parts.join(", "))
    }
}
