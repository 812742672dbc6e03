//! Plain data row types written by output backends.

/// Both cumulative counts of one link at one step boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkCurveRow {
    pub link:               u32,
    /// Boundary index; boundary `t` is the start of step `t`.
    pub boundary:           u64,
    pub clock_secs:         u64,
    pub cumulative_inflow:  f64,
    pub cumulative_outflow: f64,
}

/// Summary of one loaded step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSummaryRow {
    pub step:         u64,
    pub clock_secs:   u64,
    pub iterations:   u64,
    pub node_updates: u64,
    pub network_flow: f64,
}
