//! Agent Beep - AI 编码代理会话事件的提示音通知
//!
//! 消费宿主投递的生命周期事件（会话转入空闲、权限提示、问题提示），
//! 按两层配置决定是否响铃。核心是纯决策逻辑：配置合并、会话边沿
//! 判定、全局限流；声音播放和桌面提示作为协作方注入。

pub mod beep;
pub mod config;
pub mod player;
pub mod toast;

pub use beep::{
    BeepDispatcher, BeepThrottle, HostEvent, SessionStatus, SessionStatusTracker,
    ThrottleDecision,
};
pub use beep::{resolve_event_settings, ResolvedSettings};
pub use config::{load, load_layered, BeepConfig, ConfigLoadResult, EventConfig, EventKey};
pub use player::{CommandPlayer, PlayOutcome, SoundPlayer};
pub use toast::{DebugToast, DesktopToast, Severity};
