//! One-shot software timers dispatched from their owner's own loop.
//!
//! Each actor keeps its deadlines in plain state and polls them with
//! its loop timestamp, so timer work never runs on a foreign context
//! and the single-writer rule holds by construction.

/// A one-shot millisecond deadline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Deadline(Option<u64>);

impl Deadline {
    /// A timer that is not running.
    pub const fn idle() -> Self {
        Self(None)
    }

    /// Start (or restart) the timer `after_ms` past `now_ms`.
    pub fn arm(&mut self, now_ms: u64, after_ms: u64) {
        self.0 = Some(now_ms + after_ms);
    }

    pub fn stop(&mut self) {
        self.0 = None;
    }

    pub fn is_armed(&self) -> bool {
        self.0.is_some()
    }

    /// True exactly once when the deadline passes; the timer stops
    /// itself. Callers re-arm for periodic behaviour.
    pub fn fire(&mut self, now_ms: u64) -> bool {
        match self.0 {
            Some(at) if now_ms >= at => {
                self.0 = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Deadline;

    #[test]
    fn fires_once_at_deadline() {
        let mut t = Deadline::idle();
        t.arm(100, 50);
        assert!(!t.fire(149));
        assert!(t.fire(150));
        assert!(!t.fire(151));
        assert!(!t.is_armed());
    }

    #[test]
    fn rearming_pushes_the_deadline() {
        let mut t = Deadline::idle();
        t.arm(0, 100);
        t.arm(60, 100);
        assert!(!t.fire(100));
        assert!(t.fire(160));
    }

    #[test]
    fn stopped_timer_never_fires() {
        let mut t = Deadline::idle();
        t.arm(0, 10);
        t.stop();
        assert!(!t.fire(1_000));
    }
}
