//! 限流门 - 全局单槽冷却窗口
//!
//! 所有事件类别和所有会话共用一个槽：窗口内只放行第一次触发。
//! 窗口毫秒数来自配置原始值，在这里钳制到 ≥ 0。

use std::time::Instant;

/// 一次限流判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleDecision {
    pub allowed: bool,
    /// 距离下次放行还需等待的毫秒数，放行时为 0
    pub remaining_ms: u64,
}

/// 限流门
pub struct BeepThrottle {
    last_fired: Option<Instant>,
}

impl BeepThrottle {
    pub fn new() -> Self {
        Self { last_fired: None }
    }

    /// 尝试放行：窗口内拒绝并给出剩余等待时间，否则记录本次触发
    pub fn try_fire(&mut self, throttle_ms: f64) -> ThrottleDecision {
        self.try_fire_at(throttle_ms, Instant::now())
    }

    /// 带时间戳的判定，测试用
    pub fn try_fire_at(&mut self, throttle_ms: f64, now: Instant) -> ThrottleDecision {
        let window_ms = if throttle_ms.is_finite() {
            throttle_ms.max(0.0)
        } else {
            0.0
        };

        if let Some(last) = self.last_fired {
            let elapsed_ms = now.saturating_duration_since(last).as_millis() as f64;
            let remaining = window_ms - elapsed_ms;
            if remaining > 0.0 {
                return ThrottleDecision {
                    allowed: false,
                    remaining_ms: remaining.ceil() as u64,
                };
            }
        }

        self.last_fired = Some(now);
        ThrottleDecision {
            allowed: true,
            remaining_ms: 0,
        }
    }
}

impl Default for BeepThrottle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_fire_always_allowed() {
        let mut throttle = BeepThrottle::new();
        let decision = throttle.try_fire(2000.0);
        assert!(decision.allowed);
        assert_eq!(decision.remaining_ms, 0);
    }

    #[test]
    fn test_second_fire_within_window_denied() {
        let mut throttle = BeepThrottle::new();
        let start = Instant::now();

        assert!(throttle.try_fire_at(2000.0, start).allowed);

        let decision = throttle.try_fire_at(2000.0, start + Duration::from_millis(10));
        assert!(!decision.allowed);
        assert_eq!(decision.remaining_ms, 1990);
    }

    #[test]
    fn test_fire_after_window_allowed() {
        let mut throttle = BeepThrottle::new();
        let start = Instant::now();

        assert!(throttle.try_fire_at(100.0, start).allowed);
        assert!(
            throttle
                .try_fire_at(100.0, start + Duration::from_millis(100))
                .allowed
        );
    }

    #[test]
    fn test_denied_attempt_does_not_rearm_window() {
        let mut throttle = BeepThrottle::new();
        let start = Instant::now();

        assert!(throttle.try_fire_at(100.0, start).allowed);
        // 拒绝不应重置窗口起点
        assert!(
            !throttle
                .try_fire_at(100.0, start + Duration::from_millis(60))
                .allowed
        );
        assert!(
            throttle
                .try_fire_at(100.0, start + Duration::from_millis(110))
                .allowed
        );
    }

    #[test]
    fn test_zero_window_never_throttles() {
        let mut throttle = BeepThrottle::new();
        let start = Instant::now();
        for i in 0..5 {
            assert!(
                throttle
                    .try_fire_at(0.0, start + Duration::from_millis(i))
                    .allowed
            );
        }
    }

    #[test]
    fn test_negative_and_non_finite_windows_clamped() {
        let mut throttle = BeepThrottle::new();
        let start = Instant::now();
        assert!(throttle.try_fire_at(-500.0, start).allowed);
        assert!(throttle.try_fire_at(-500.0, start).allowed);
        assert!(throttle.try_fire_at(f64::NAN, start).allowed);
    }
}
