use aya_ebpf::{
    helpers::bpf_get_current_pid_tgid, macros::tracepoint, programs::TracePointContext,
};
use aya_log_ebpf::debug;
use syscost_common::{descend, filter::FilterPolicy, metrics::TraceMetric, task_id::TaskId};

use crate::helpers::{bump, is_descendant, load_filter};
use crate::maps::DESCENDANTS;

/*
name: sched_process_fork
format:
    field:unsigned short common_type;	offset:0;	size:2;	signed:0;
    field:unsigned char common_flags;	offset:2;	size:1;	signed:0;
    field:unsigned char common_preempt_count;	offset:3;	size:1;	signed:0;
    field:int common_pid;	offset:4;	size:4;	signed:1;

    field:__data_loc char[] parent_comm;	offset:8;	size:4;	signed:0;
    field:pid_t parent_pid;	offset:12;	size:4;	signed:1;
    field:__data_loc char[] child_comm;	offset:16;	size:4;	signed:0;
    field:pid_t child_pid;	offset:20;	size:4;	signed:1;

print fmt: "comm=%s pid=%d child_comm=%s child_pid=%d", __get_str(parent_comm), REC->parent_pid, __get_str(child_comm), REC->child_pid
*/

const FORK_CHILD_PID_OFFSET: usize = 20;

#[tracepoint]
pub fn syscost_sched_process_fork(ctx: TracePointContext) -> u32 {
    match try_sched_process_fork(&ctx) {
        Ok(ret) => ret,
        Err(ret) => ret as u32,
    }
}

fn try_sched_process_fork(ctx: &TracePointContext) -> Result<u32, i64> {
    let Some(filter) = load_filter() else {
        return Ok(0);
    };
    let FilterPolicy::FollowDescendants(root) = filter.policy else {
        return Ok(0);
    };

    // Runs in the forking task's context, so the parent is the current
    // tgid. This also catches forks made from a non-leader thread.
    let parent_tgid = TaskId::from_raw(bpf_get_current_pid_tgid()).tgid();
    if !descend::child_joins(root, parent_tgid, is_descendant) {
        return Ok(0);
    }

    let child_pid: i32 = unsafe { ctx.read_at(FORK_CHILD_PID_OFFSET)? };
    if DESCENDANTS.insert(&(child_pid as u32), &0, 0).is_err() {
        // Set full: the child goes untraced.
        bump(TraceMetric::DescendantOverflow);
        return Ok(0);
    }
    debug!(ctx, "tracking forked process {}", child_pid);
    Ok(0)
}

/*
name: sched_process_exit
format:
    field:unsigned short common_type;	offset:0;	size:2;	signed:0;
    field:unsigned char common_flags;	offset:2;	size:1;	signed:0;
    field:unsigned char common_preempt_count;	offset:3;	size:1;	signed:0;
    field:int common_pid;	offset:4;	size:4;	signed:1;

    field:char comm[16];	offset:8;	size:16;	signed:0;
    field:pid_t pid;	offset:24;	size:4;	signed:1;
    field:int prio;	offset:28;	size:4;	signed:1;

print fmt: "comm=%s pid=%d prio=%d", REC->comm, REC->pid, REC->prio
*/

#[tracepoint]
pub fn syscost_sched_process_exit(ctx: TracePointContext) -> u32 {
    let Some(filter) = load_filter() else {
        return 0;
    };
    if !filter.follows_descendants() {
        return 0;
    }

    // Runs in the exiting task's context. Removing the task's own id ends
    // tracking for a dead process and also cleans up thread ids as they
    // die.
    let pid = TaskId::from_raw(bpf_get_current_pid_tgid()).pid();
    if is_descendant(pid) {
        let _ = DESCENDANTS.remove(&pid);
        debug!(&ctx, "no longer tracking dead process {}", pid);
    }
    0
}
