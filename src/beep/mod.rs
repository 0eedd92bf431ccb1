//! 通知决策核心 - 事件分类、会话边沿、限流与触发
//!
//! # 数据流
//! 宿主事件 → [`dispatcher::BeepDispatcher`] → 状态事件先过
//! [`session::SessionStatusTracker`] 的边沿判定 →
//! [`resolver::resolve_event_settings`] 落出具体参数 →
//! [`throttle::BeepThrottle`] 门控 → 播放/提示协作方。

pub mod dispatcher;
pub mod event;
pub mod resolver;
pub mod session;
pub mod throttle;

pub use dispatcher::BeepDispatcher;
pub use event::{source, BeepDetails, HostEvent};
pub use resolver::{normalize_repeat, resolve_event_settings, ResolvedSettings};
pub use session::{SessionStatus, SessionStatusTracker};
pub use throttle::{BeepThrottle, ThrottleDecision};
