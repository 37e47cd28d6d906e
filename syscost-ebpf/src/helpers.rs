use syscost_common::{filter::TraceFilter, metrics::TraceMetric, ConfigKey};

use crate::maps::{CONFIG, DESCENDANTS, METRICS};

/// The session filter, or `None` until userspace has seeded every CONFIG
/// cell with a valid value. `None` means trace nothing.
#[inline(always)]
pub fn load_filter() -> Option<TraceFilter> {
    let mode = unsafe { CONFIG.get(&(ConfigKey::FilterMode as u32)) }.copied()?;
    let target = unsafe { CONFIG.get(&(ConfigKey::TargetTgid as u32)) }.copied()?;
    let self_tgid = unsafe { CONFIG.get(&(ConfigKey::SelfTgid as u32)) }.copied()?;
    TraceFilter::from_cells(mode, target, self_tgid)
}

/// Membership probe for follow mode.
#[inline(always)]
pub fn is_descendant(tgid: u32) -> bool {
    unsafe { DESCENDANTS.get(&tgid) }.is_some()
}

/// Bump a diagnostic counter. Best effort: concurrent bumps of the same
/// counter may lose updates.
pub fn bump(metric: TraceMetric) {
    let key = metric as u32;
    let next = unsafe { METRICS.get(&key) }.copied().unwrap_or(0) + 1;
    let _ = METRICS.insert(&key, &next, 0);
}
