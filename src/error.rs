//! Unified error type for zonelight.
//!
//! We avoid `alloc` - all variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.
//!
//! Two conditions are deliberately *not* errors: a combination-code or
//! clap mismatch silently resets that detector's progress, and a touch
//! that hits no widget simply produces no command.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Bank bus
    /// A bus phase never completed within the spin budget.
    ///
    /// The wait is bounded so a wedged expander aborts the current
    /// transaction instead of stalling the poll loop forever. Terminal
    /// for that call; no retry.
    BusTimeout,

    // Command channel
    /// A non-blocking send found the queue full and dropped the
    /// message. Accepted lossy degradation under burst load - logged,
    /// never retried.
    QueueOverflow,
}
