use aya_ebpf::{
    helpers::{bpf_get_current_pid_tgid, bpf_ktime_get_ns},
    macros::tracepoint,
    programs::TracePointContext,
};
use syscost_common::{
    engine::{self, ExitDisposition},
    metrics::TraceMetric,
    stats::SyscallStat,
    task_id::TaskId,
    SYSCALL_TABLE_SIZE,
};

use crate::helpers::{bump, is_descendant, load_filter};
use crate::maps::{INFLIGHT, SYSCALL_STATS};

/*
name: sys_enter
format:
    field:unsigned short common_type;	offset:0;	size:2;	signed:0;
    field:unsigned char common_flags;	offset:2;	size:1;	signed:0;
    field:unsigned char common_preempt_count;	offset:3;	size:1;	signed:0;
    field:int common_pid;	offset:4;	size:4;	signed:1;

    field:long id;	offset:8;	size:8;	signed:1;
    field:unsigned long args[6];	offset:16;	size:48;	signed:0;

print fmt: "NR %ld (%lx, %lx, %lx, %lx, %lx, %lx)", REC->id, REC->args[0], REC->args[1], REC->args[2], REC->args[3], REC->args[4], REC->args[5]
*/

#[tracepoint]
pub fn syscost_sys_enter(_ctx: TracePointContext) -> u32 {
    let now = unsafe { bpf_ktime_get_ns() };
    let Some(filter) = load_filter() else {
        return 0;
    };
    let task = TaskId::from_raw(bpf_get_current_pid_tgid());

    let Some(ptr) = INFLIGHT.get_ptr_mut(0) else {
        return 0;
    };
    let slot = unsafe { &mut *ptr };

    engine::syscall_entered(slot, &filter, task, now, is_descendant);
    0
}

/*
name: sys_exit
format:
    field:unsigned short common_type;	offset:0;	size:2;	signed:0;
    field:unsigned char common_flags;	offset:2;	size:1;	signed:0;
    field:unsigned char common_preempt_count;	offset:3;	size:1;	signed:0;
    field:int common_pid;	offset:4;	size:4;	signed:1;

    field:long id;	offset:8;	size:8;	signed:1;
    field:long ret;	offset:16;	size:8;	signed:1;

print fmt: "NR %ld = %ld", REC->id, REC->ret
*/

const SYS_EXIT_ID_OFFSET: usize = 8;
const SYS_EXIT_RET_OFFSET: usize = 16;

#[tracepoint]
pub fn syscost_sys_exit(ctx: TracePointContext) -> u32 {
    match try_sys_exit(&ctx) {
        Ok(ret) => ret,
        Err(ret) => ret as u32,
    }
}

fn try_sys_exit(ctx: &TracePointContext) -> Result<u32, i64> {
    let now = unsafe { bpf_ktime_get_ns() };
    let syscall_id: i64 = unsafe { ctx.read_at(SYS_EXIT_ID_OFFSET)? };
    let ret: i64 = unsafe { ctx.read_at(SYS_EXIT_RET_OFFSET)? };

    let Some(filter) = load_filter() else {
        return Ok(0);
    };
    let task = TaskId::from_raw(bpf_get_current_pid_tgid());

    let Some(ptr) = INFLIGHT.get_ptr_mut(0) else {
        return Ok(0);
    };
    let slot = unsafe { &mut *ptr };
    let row = row_ptr(syscall_id).map(|p| unsafe { &mut *p });

    match engine::syscall_exited(slot, row, &filter, task, syscall_id, ret, now, is_descendant) {
        ExitDisposition::OwnerMismatch => bump(TraceMetric::OwnerMismatch),
        ExitDisposition::NoRow => bump(TraceMetric::RowOutOfRange),
        _ => {}
    }
    Ok(0)
}

fn row_ptr(syscall_id: i64) -> Option<*mut SyscallStat> {
    if syscall_id < 0 || syscall_id >= SYSCALL_TABLE_SIZE as i64 {
        return None;
    }
    SYSCALL_STATS.get_ptr_mut(syscall_id as u32)
}
