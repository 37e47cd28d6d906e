//! Which tasks get their syscalls measured.

use crate::task_id::TaskId;

/// CONFIG-cell encoding of the policy tag. Anything else decodes to `None`
/// and the event is skipped.
pub const MODE_UNRESTRICTED: u64 = 0;
pub const MODE_SINGLE_TARGET: u64 = 1;
pub const MODE_FOLLOW_DESCENDANTS: u64 = 2;

/// Scope of a tracing session, fixed at attach time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPolicy {
    /// Every process on the host.
    Unrestricted,
    /// One process only.
    SingleTarget(u32),
    /// One process plus everything it forks while traced.
    FollowDescendants(u32),
}

/// The resolved filter, consulted identically on the entry and exit paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceFilter {
    pub self_tgid: u32,
    pub policy: FilterPolicy,
}

impl TraceFilter {
    /// First match decides: the profiler's own process is never traced,
    /// then the policy applies. `is_descendant` is consulted only in
    /// follow mode, and only when the task is not the root itself.
    #[inline(always)]
    pub fn admits<F>(&self, task: TaskId, is_descendant: F) -> bool
    where
        F: FnOnce(u32) -> bool,
    {
        let tgid = task.tgid();
        if tgid == self.self_tgid {
            return false;
        }
        match self.policy {
            FilterPolicy::Unrestricted => true,
            FilterPolicy::SingleTarget(target) => tgid == target,
            FilterPolicy::FollowDescendants(root) => tgid == root || is_descendant(tgid),
        }
    }

    /// Does this session need the fork/exit tracker attached?
    pub fn follows_descendants(&self) -> bool {
        matches!(self.policy, FilterPolicy::FollowDescendants(_))
    }

    /// The `(FilterMode, TargetTgid)` cells for the CONFIG map.
    pub fn mode_cells(&self) -> (u64, u64) {
        match self.policy {
            FilterPolicy::Unrestricted => (MODE_UNRESTRICTED, 0),
            FilterPolicy::SingleTarget(target) => (MODE_SINGLE_TARGET, target as u64),
            FilterPolicy::FollowDescendants(root) => (MODE_FOLLOW_DESCENDANTS, root as u64),
        }
    }

    /// Rebuild the filter from CONFIG cells. `None` until userspace has
    /// seeded a valid mode, so an unseeded map traces nothing.
    pub fn from_cells(mode: u64, target: u64, self_tgid: u64) -> Option<TraceFilter> {
        let policy = match mode {
            MODE_UNRESTRICTED => FilterPolicy::Unrestricted,
            MODE_SINGLE_TARGET => FilterPolicy::SingleTarget(target as u32),
            MODE_FOLLOW_DESCENDANTS => FilterPolicy::FollowDescendants(target as u32),
            _ => return None,
        };
        Some(TraceFilter {
            self_tgid: self_tgid as u32,
            policy,
        })
    }
}
