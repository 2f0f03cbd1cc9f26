use embassy_time::Duration;

/// Time to wait for the SIM to confirm a session abort before forcing a menu
/// fetch
pub fn stk_abort_fallback() -> Duration {
    Duration::from_secs(1)
}

/// Settle time between a SIM insertion and the automatic toolkit session start
pub fn stk_sim_settle() -> Duration {
    Duration::from_secs(2)
}

/// Spacing between SMS readiness probes
pub fn sms_probe_retry() -> Duration {
    Duration::from_secs(1)
}

/// Delay between disabling signal quality reports and reporting the suspend
/// as done, giving a pending query on the secondary channel time to flush
pub fn suspend_flush() -> Duration {
    Duration::from_millis(500)
}

/// Spacing between attempts of a retried command
pub fn retry_delay() -> Duration {
    Duration::from_secs(1)
}
