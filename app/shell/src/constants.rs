//! Tuning constants for the shell core.
//!
//! Timing values are calibrated against how fast Hyprland emits events and
//! how quickly generated theme artifacts settle on disk. Fallback values are
//! what the store publishes when an external query fails.

/// Timing constants for debouncing, polling, and lifecycles.
pub mod timing {
    /// Debounce window for window-manager event bursts (ms).
    ///
    /// Hyprland emits several socket lines per workspace switch. One refresh
    /// per burst is enough.
    pub const EVENT_DEBOUNCE_MS: u64 = 50;

    /// Debounce window for theme artifact regeneration (ms).
    ///
    /// Matugen rewrites its output files several times per palette run.
    pub const THEME_DEBOUNCE_MS: u64 = 400;

    /// Delay before restarting a dead event bridge session (ms).
    pub const BRIDGE_RESTART_DELAY_MS: u64 = 1200;

    /// Interval of the unconditional safety-net refresh (s).
    ///
    /// Bounds staleness even when the event bridge silently stops
    /// delivering lines without closing its stream.
    pub const SAFETY_POLL_SECS: u64 = 1;

    /// Interval of the fallback poller used when `socat` is absent (s).
    pub const FALLBACK_POLL_SECS: u64 = 1;

    /// Interval of the clock refresh (s).
    pub const CLOCK_TICK_SECS: u64 = 1;

    /// Maximum time an external query may run before it counts as failed (ms).
    pub const QUERY_TIMEOUT_MS: u64 = 1500;

    /// Default auto-dismiss timeout for notifications (ms).
    pub const NOTIFICATION_TIMEOUT_MS: u64 = 4200;

    /// Time a dismissed notification stays in the leaving state before it is
    /// purged, long enough for the exit animation to run (ms).
    pub const NOTIFICATION_LEAVE_MS: u64 = 190;
}

/// Values published when an external query fails or returns nothing usable.
pub mod fallback {
    /// Active window title when no window is focused or the query failed.
    pub const WINDOW_TITLE: &str = "Desktop";

    /// Workspace id when the active-workspace query failed.
    pub const WORKSPACE_ID: i32 = 1;

    /// Media line when nothing is playing or `playerctl` failed.
    pub const MEDIA_INFO: &str = "Nothing playing";

    /// Battery text when `upower` reports nothing.
    pub const BATTERY_TEXT: &str = "--%";

    /// Clock text before the first tick.
    pub const CLOCK_TEXT: &str = "--:--";

    /// Single entry shown in the overview when the client query failed or
    /// returned no titled windows.
    pub const OVERVIEW_EMPTY: &str = "No active windows";
}

/// How many notifications a consumer is expected to render at once.
pub const VISIBLE_NOTIFICATIONS: usize = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_debounce_is_shorter_than_theme_debounce() {
        assert!(timing::EVENT_DEBOUNCE_MS < timing::THEME_DEBOUNCE_MS);
    }

    #[test]
    fn restart_delay_exceeds_debounce_windows() {
        assert!(timing::BRIDGE_RESTART_DELAY_MS > timing::THEME_DEBOUNCE_MS);
    }

    #[test]
    fn leave_duration_is_shorter_than_default_timeout() {
        assert!(timing::NOTIFICATION_LEAVE_MS < timing::NOTIFICATION_TIMEOUT_MS);
    }
}
