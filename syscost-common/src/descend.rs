//! Follow-mode membership rules for the fork/exit tracker.

/// Should a fork by `parent_tgid` put the child in the tracked set? True
/// for forks by the root and forks by any existing member, including
/// forks made from a non-leader thread of either.
#[inline(always)]
pub fn child_joins<F>(root: u32, parent_tgid: u32, is_member: F) -> bool
where
    F: FnOnce(u32) -> bool,
{
    parent_tgid == root || is_member(parent_tgid)
}
