//! Focus timer countdown state machine.
//!
//! # Responsibility
//! - Track one 25-minute focus session driven by external one-second ticks.
//!
//! # Invariants
//! - Reaching zero auto-stops and restores the full duration; a new cycle
//!   must be started explicitly.
//! - The timer is session-scoped and never persisted.

/// Focus session length in seconds.
pub const FOCUS_SESSION_SECS: u32 = 25 * 60;

/// Points awarded when a focus session runs to completion.
pub const FOCUS_COMPLETION_POINTS: i64 = 30;

/// Result of advancing the timer by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// The timer is not running; nothing changed.
    Idle,
    /// The countdown advanced and is still running.
    Running { remaining_secs: u32 },
    /// The countdown reached zero; the timer stopped and reset itself.
    Completed,
}

/// Countdown state: a running flag plus remaining seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTimer {
    remaining_secs: u32,
    is_running: bool,
}

impl Default for FocusTimer {
    fn default() -> FocusTimer {
        FocusTimer {
            remaining_secs: FOCUS_SESSION_SECS,
            is_running: false,
        }
    }
}

impl FocusTimer {
    pub fn new() -> FocusTimer {
        FocusTimer::default()
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// `"MM:SS"` display form of the remaining time.
    pub fn display(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_secs / 60,
            self.remaining_secs % 60
        )
    }

    pub fn start(&mut self) {
        self.is_running = true;
    }

    pub fn pause(&mut self) {
        self.is_running = false;
    }

    /// Stops the countdown if running, then restores the full duration.
    pub fn reset(&mut self) {
        self.is_running = false;
        self.remaining_secs = FOCUS_SESSION_SECS;
    }

    /// Advances the countdown by one second of real time.
    pub fn tick(&mut self) -> TimerTick {
        if !self.is_running {
            return TimerTick::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.is_running = false;
            self.remaining_secs = FOCUS_SESSION_SECS;
            return TimerTick::Completed;
        }
        TimerTick::Running {
            remaining_secs: self.remaining_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FocusTimer, TimerTick, FOCUS_SESSION_SECS};

    #[test]
    fn tick_is_a_no_op_while_idle() {
        let mut timer = FocusTimer::new();
        assert_eq!(timer.tick(), TimerTick::Idle);
        assert_eq!(timer.remaining_secs(), FOCUS_SESSION_SECS);
    }

    #[test]
    fn countdown_runs_and_completes_after_full_duration() {
        let mut timer = FocusTimer::new();
        timer.start();

        for _ in 0..FOCUS_SESSION_SECS - 1 {
            assert!(matches!(timer.tick(), TimerTick::Running { .. }));
        }
        assert_eq!(timer.tick(), TimerTick::Completed);

        // Auto-stopped and restored, ready for a manual restart.
        assert!(!timer.is_running());
        assert_eq!(timer.remaining_secs(), FOCUS_SESSION_SECS);
    }

    #[test]
    fn reset_while_running_stops_and_restores_duration() {
        let mut timer = FocusTimer::new();
        timer.start();
        timer.tick();
        timer.tick();
        assert!(timer.remaining_secs() < FOCUS_SESSION_SECS);

        timer.reset();
        assert!(!timer.is_running());
        assert_eq!(timer.remaining_secs(), FOCUS_SESSION_SECS);
    }

    #[test]
    fn pause_freezes_the_countdown() {
        let mut timer = FocusTimer::new();
        timer.start();
        timer.tick();
        let frozen = timer.remaining_secs();

        timer.pause();
        assert_eq!(timer.tick(), TimerTick::Idle);
        assert_eq!(timer.remaining_secs(), frozen);
    }

    #[test]
    fn display_formats_minutes_and_seconds() {
        let timer = FocusTimer::new();
        assert_eq!(timer.display(), "25:00");
    }
}
