//! The ordered entry/exit transitions, shared between the BPF programs and
//! the userspace test harness.
//!
//! Callers own the single-writer discipline: on the kernel side the
//! tracepoint programs run to completion on their CPU, so the `&mut` state
//! they pass is never aliased. Every branch falls back to doing nothing;
//! skipping an event undercounts, which is the tolerated direction.

use crate::filter::TraceFilter;
use crate::stats::{InflightRecord, SyscallStat};
use crate::syscall::{is_restart_return, RESTART_SYSCALL_ID};
use crate::task_id::TaskId;

/// What the exit path did with an event. Variant order mirrors check
/// order; an earlier check short-circuits the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDisposition {
    /// The call settled and was folded into its row (elapsed nanoseconds).
    Counted(u64),
    /// The event is `restart_syscall(2)` itself, a kernel re-entry vehicle
    /// rather than a call the workload made.
    RestartSentinel,
    /// The kernel will transparently re-enter this call; a later exit
    /// stands for it.
    WouldRestart,
    /// The task is not being traced.
    Filtered,
    /// No in-flight record on this CPU: the entry predated attach, was
    /// overwritten, or happened on another CPU.
    NoEntry,
    /// The record belongs to a different task. It is left in place so the
    /// owner's own exit can still settle it.
    OwnerMismatch,
    /// No stats row for this syscall id. The record is left in place.
    NoRow,
}

/// Entry path: admit, then take this CPU's slot unconditionally. The
/// fresh call wins over any abandoned record.
#[inline(always)]
pub fn syscall_entered<F>(
    slot: &mut InflightRecord,
    filter: &TraceFilter,
    task: TaskId,
    now_ns: u64,
    is_descendant: F,
) where
    F: FnOnce(u32) -> bool,
{
    if !filter.admits(task, is_descendant) {
        return;
    }
    slot.arm(task, now_ns);
}

/// Exit path. Restart artifacts are discarded before the task's identity
/// is even considered, then the filter, then slot pairing, then the row
/// update. Only `Counted` clears the slot.
#[inline(always)]
pub fn syscall_exited<F>(
    slot: &mut InflightRecord,
    row: Option<&mut SyscallStat>,
    filter: &TraceFilter,
    task: TaskId,
    syscall_id: i64,
    ret: i64,
    now_ns: u64,
    is_descendant: F,
) -> ExitDisposition
where
    F: FnOnce(u32) -> bool,
{
    if syscall_id == RESTART_SYSCALL_ID {
        return ExitDisposition::RestartSentinel;
    }
    if is_restart_return(ret) {
        return ExitDisposition::WouldRestart;
    }
    if !filter.admits(task, is_descendant) {
        return ExitDisposition::Filtered;
    }
    if slot.is_vacant() {
        return ExitDisposition::NoEntry;
    }
    if !slot.owned_by(task) {
        return ExitDisposition::OwnerMismatch;
    }
    let Some(row) = row else {
        return ExitDisposition::NoRow;
    };
    let elapsed = slot.elapsed_ns(now_ns);
    row.record(elapsed);
    slot.clear();
    ExitDisposition::Counted(elapsed)
}
