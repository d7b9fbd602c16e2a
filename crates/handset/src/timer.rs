use bzr_core::*;
use std::time::Duration;
use tokio::time::Instant;

/// Handset timeouts.
#[derive(Debug, Clone, Copy)]
pub struct TimerConfig {
    pub registration: Duration,
    pub debounce: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            registration: REGISTRATION_TIMEOUT,
            debounce: DEBOUNCE,
        }
    }
}

/// Single pending deadline: either the registration ack or the press settle.
#[derive(Debug)]
pub struct Timer {
    config: TimerConfig,
    deadline: Option<Instant>,
}

impl Timer {
    pub fn new(config: TimerConfig) -> Self {
        Self {
            config,
            deadline: None,
        }
    }
    pub fn start_registration(&mut self, now: Instant) {
        self.deadline = Some(now + self.config.registration);
    }
    pub fn start_debounce(&mut self, now: Instant) {
        self.deadline = Some(now + self.config.debounce);
    }
    pub fn clear(&mut self) {
        self.deadline = None;
    }
    pub fn expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn default_config() {
        let config = TimerConfig::default();
        assert_eq!(config.registration, Duration::from_secs(10));
        assert_eq!(config.debounce, Duration::from_millis(100));
    }
    #[test]
    fn timer_starts_cleared() {
        let timer = Timer::new(TimerConfig::default());
        assert!(!timer.expired(Instant::now() + REGISTRATION_TIMEOUT));
    }
    #[test]
    fn deadlines_expire_inclusively() {
        let now = Instant::now();
        let mut timer = Timer::new(TimerConfig::default());
        timer.start_debounce(now);
        assert!(!timer.expired(now + Duration::from_millis(99)));
        assert!(timer.expired(now + DEBOUNCE));
        timer.start_registration(now);
        assert!(!timer.expired(now + DEBOUNCE));
        assert!(timer.expired(now + REGISTRATION_TIMEOUT));
        timer.clear();
        assert!(!timer.expired(now + REGISTRATION_TIMEOUT));
    }
}
