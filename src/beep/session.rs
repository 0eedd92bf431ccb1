//! 会话状态跟踪 - 识别 busy/retry → idle 的边沿
//!
//! 每个会话只存最后一次观察到的状态。跟踪器本身不做触发判定，
//! 边沿规则由分发器执行。存储是有界 + TTL 过期的键值表：
//! 过期和超量条目在写入时清理，读取从不修改状态。

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// 会话状态标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Busy,
    Retry,
    Idle,
    /// 初始状态，也是无法识别的标签的归宿
    Unknown,
}

impl SessionStatus {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "busy" => SessionStatus::Busy,
            "retry" => SessionStatus::Retry,
            "idle" => SessionStatus::Idle,
            _ => SessionStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Busy => "busy",
            SessionStatus::Retry => "retry",
            SessionStatus::Idle => "idle",
            SessionStatus::Unknown => "unknown",
        }
    }

    /// busy 或 retry：空闲提醒只在离开这两种状态时触发
    pub fn is_working(&self) -> bool {
        matches!(self, SessionStatus::Busy | SessionStatus::Retry)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    status: SessionStatus,
    updated_at: Instant,
}

/// 会话状态跟踪器
pub struct SessionStatusTracker {
    sessions: HashMap<String, Entry>,
    /// 条目存活时长
    ttl: Duration,
    /// 会话数上限，超出时淘汰最旧条目
    capacity: usize,
}

impl SessionStatusTracker {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            ttl: Duration::from_secs(6 * 60 * 60),
            capacity: 1024,
        }
    }

    /// 设置条目 TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// 设置会话数上限
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// 覆写会话状态，返回之前存储的状态（没有则 unknown）
    pub fn record_status(&mut self, session_id: &str, status: SessionStatus) -> SessionStatus {
        self.record_status_at(session_id, status, Instant::now())
    }

    /// 带时间戳的覆写，测试用
    pub fn record_status_at(
        &mut self,
        session_id: &str,
        status: SessionStatus,
        now: Instant,
    ) -> SessionStatus {
        let prev = self
            .sessions
            .insert(
                session_id.to_string(),
                Entry {
                    status,
                    updated_at: now,
                },
            )
            .map(|entry| entry.status)
            .unwrap_or(SessionStatus::Unknown);
        self.cleanup(now);
        prev
    }

    /// 只读查看，不改动任何条目
    pub fn last_status(&self, session_id: &str) -> SessionStatus {
        self.sessions
            .get(session_id)
            .map(|entry| entry.status)
            .unwrap_or(SessionStatus::Unknown)
    }

    /// 强制置为 idle，不返回旧值
    pub fn set_idle(&mut self, session_id: &str) {
        self.set_idle_at(session_id, Instant::now());
    }

    pub fn set_idle_at(&mut self, session_id: &str, now: Instant) {
        self.sessions.insert(
            session_id.to_string(),
            Entry {
                status: SessionStatus::Idle,
                updated_at: now,
            },
        );
        self.cleanup(now);
    }

    /// 当前跟踪的会话数
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// 清理过期条目；仍超量时淘汰最旧的
    fn cleanup(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.sessions
            .retain(|_, entry| now.duration_since(entry.updated_at) < ttl);
        while self.sessions.len() > self.capacity {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|(_, entry)| entry.updated_at)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    self.sessions.remove(&id);
                }
                None => break,
            }
        }
    }
}

impl Default for SessionStatusTracker {
    fn default() -> Self {
        Self::new()
    }
}
