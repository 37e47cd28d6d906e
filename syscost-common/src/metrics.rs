//! Diagnostic counters, kept out of the measurement tables. The kernel
//! side bumps them on its silent-skip branches; userspace logs them once
//! at shutdown.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceMetric {
    /// Exits skipped because the in-flight record belonged to another task.
    OwnerMismatch = 0,
    /// Forks left untracked because the descendant set was full.
    DescendantOverflow = 1,
    /// Exits whose syscall id had no row in the stats table.
    RowOutOfRange = 2,
}

impl TraceMetric {
    pub const ALL: [TraceMetric; 3] = [
        TraceMetric::OwnerMismatch,
        TraceMetric::DescendantOverflow,
        TraceMetric::RowOutOfRange,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TraceMetric::OwnerMismatch => "exit_owner_mismatch",
            TraceMetric::DescendantOverflow => "descendant_overflow",
            TraceMetric::RowOutOfRange => "row_out_of_range",
        }
    }
}
