//! Session-level behavior: several CPUs, task migration, fork tracking,
//! restart sequences. The `Session` rig stands in for the kernel maps,
//! one slot and one stats table per CPU plus the bounded descendant set,
//! and drives the same transition functions the BPF programs call.

use std::collections::HashSet;

use syscost_common::descend;
use syscost_common::engine::{syscall_entered, syscall_exited, ExitDisposition};
use syscost_common::filter::{FilterPolicy, TraceFilter};
use syscost_common::stats::{InflightRecord, SyscallStat};
use syscost_common::syscall::RESTART_SYSCALL_ID;
use syscost_common::task_id::TaskId;
use syscost_common::SYSCALL_TABLE_SIZE;

const PROFILER: u32 = 999_999;

struct Session {
    filter: TraceFilter,
    slots: Vec<InflightRecord>,
    tables: Vec<Vec<SyscallStat>>,
    members: HashSet<u32>,
    capacity: usize,
}

impl Session {
    fn new(cpus: usize, policy: FilterPolicy) -> Self {
        Session {
            filter: TraceFilter {
                self_tgid: PROFILER,
                policy,
            },
            slots: vec![InflightRecord::default(); cpus],
            tables: vec![vec![SyscallStat::default(); SYSCALL_TABLE_SIZE as usize]; cpus],
            members: HashSet::new(),
            capacity: 64,
        }
    }

    fn enter(&mut self, cpu: usize, task: TaskId, now: u64) {
        let members = &self.members;
        syscall_entered(&mut self.slots[cpu], &self.filter, task, now, |tgid| {
            members.contains(&tgid)
        });
    }

    fn exit(&mut self, cpu: usize, task: TaskId, id: i64, ret: i64, now: u64) -> ExitDisposition {
        let members = &self.members;
        let row = usize::try_from(id)
            .ok()
            .and_then(|i| self.tables[cpu].get_mut(i));
        syscall_exited(
            &mut self.slots[cpu],
            row,
            &self.filter,
            task,
            id,
            ret,
            now,
            |tgid| members.contains(&tgid),
        )
    }

    /// sched_process_fork: runs in the parent's context.
    fn fork(&mut self, parent_tgid: u32, child: u32) {
        let FilterPolicy::FollowDescendants(root) = self.filter.policy else {
            return;
        };
        let members = &self.members;
        if descend::child_joins(root, parent_tgid, |tgid| members.contains(&tgid))
            && self.members.len() < self.capacity
        {
            self.members.insert(child);
        }
    }

    /// sched_process_exit: the exiting task removes its own id.
    fn reap(&mut self, pid: u32) {
        self.members.remove(&pid);
    }

    fn total(&self, id: usize) -> SyscallStat {
        let mut sum = SyscallStat::default();
        for table in &self.tables {
            sum.merge(&table[id]);
        }
        sum
    }
}

#[test]
fn single_call_settles_on_one_core() {
    let mut s = Session::new(1, FilterPolicy::Unrestricted);
    let t = TaskId::new(10, 10);

    s.enter(0, t, 1_000);
    assert_eq!(s.exit(0, t, 42, 0, 4_500), ExitDisposition::Counted(3_500));

    let total = s.total(42);
    assert_eq!(total.count, 1);
    assert_eq!(total.overhead_ns, 3_500);
    assert!(s.slots[0].is_vacant());
}

#[test]
fn totals_sum_across_cpus() {
    let mut s = Session::new(3, FilterPolicy::Unrestricted);
    for cpu in 0..3 {
        let t = TaskId::new(10 + cpu as u32, 10 + cpu as u32);
        s.enter(cpu, t, 1_000);
        assert_eq!(
            s.exit(cpu, t, 1, 0, 1_000 + (cpu as u64 + 1) * 100),
            ExitDisposition::Counted((cpu as u64 + 1) * 100)
        );
    }
    let total = s.total(1);
    assert_eq!(total.count, 3);
    assert_eq!(total.overhead_ns, 600);
}

#[test]
fn single_target_counts_exactly_its_calls() {
    let mut s = Session::new(1, FilterPolicy::SingleTarget(50));
    let target = TaskId::new(50, 50);

    for i in 0..5u64 {
        let at = 10_000 * (i + 1);
        s.enter(0, target, at);
        assert_eq!(
            s.exit(0, target, 0, 0, at + 700),
            ExitDisposition::Counted(700)
        );
    }

    // Neither a bystander nor the profiler itself leaves a trace.
    for noise in [TaskId::new(60, 60), TaskId::new(PROFILER, PROFILER)] {
        s.enter(0, noise, 90_000);
        assert_eq!(s.exit(0, noise, 0, 0, 91_000), ExitDisposition::Filtered);
    }

    let total = s.total(0);
    assert_eq!(total.count, 5);
    assert_eq!(total.overhead_ns, 5 * 700);
}

#[test]
fn follow_mode_tracks_forked_children_until_they_exit() {
    let mut s = Session::new(2, FilterPolicy::FollowDescendants(20));

    // Root forks C; C's calls count even on another CPU.
    s.fork(20, 21);
    let child = TaskId::new(21, 21);
    s.enter(1, child, 2_000);
    assert_eq!(s.exit(1, child, 0, 0, 2_700), ExitDisposition::Counted(700));

    // C forks a grandchild, which is tracked transitively.
    s.fork(21, 22);
    let grandchild = TaskId::new(22, 22);
    s.enter(0, grandchild, 3_000);
    assert_eq!(
        s.exit(0, grandchild, 3, 0, 3_050),
        ExitDisposition::Counted(50)
    );

    // Once C exits, its id is gone and its calls stop counting.
    s.reap(21);
    assert!(!s.members.contains(&21));
    s.enter(1, child, 4_000);
    assert!(s.slots[1].is_vacant());

    // A process that was never in the subtree stays invisible.
    s.enter(0, TaskId::new(30, 30), 4_000);
    assert!(s.slots[0].is_vacant());
}

#[test]
fn follow_attributes_child_calls_then_stops_at_exit() {
    let mut s = Session::new(1, FilterPolicy::FollowDescendants(70));
    s.fork(70, 71);
    let child = TaskId::new(71, 71);

    for i in 0..3u64 {
        let at = 5_000 * (i + 1);
        s.enter(0, child, at);
        assert_eq!(
            s.exit(0, child, 2, 0, at + 1_000),
            ExitDisposition::Counted(1_000)
        );
    }
    assert_eq!(s.total(2).count, 3);
    assert_eq!(s.total(2).overhead_ns, 3_000);

    // After the child dies, a process reusing its identity is invisible.
    s.reap(71);
    let imposter = TaskId::new(71, 71);
    s.enter(0, imposter, 50_000);
    assert_eq!(s.exit(0, imposter, 2, 0, 51_000), ExitDisposition::Filtered);
    assert_eq!(s.total(2).count, 3);
}

#[test]
fn fork_by_untracked_parent_adds_nothing() {
    let mut s = Session::new(1, FilterPolicy::FollowDescendants(20));
    s.fork(30, 31);
    assert!(s.members.is_empty());
}

#[test]
fn descendant_set_drops_forks_when_full() {
    let mut s = Session::new(1, FilterPolicy::FollowDescendants(1));
    s.capacity = 2;

    s.fork(1, 2);
    s.fork(1, 3);
    s.fork(1, 4);
    assert_eq!(s.members.len(), 2);
    assert!(!s.members.contains(&4));

    // The overflowed child's calls are simply not traced.
    s.enter(0, TaskId::new(4, 4), 100);
    assert!(s.slots[0].is_vacant());

    // Capacity freed by an exit can be reused by a later fork.
    s.reap(2);
    s.fork(1, 4);
    assert!(s.members.contains(&4));
}

#[test]
fn migration_loses_the_call_but_corrupts_nothing() {
    let mut s = Session::new(2, FilterPolicy::Unrestricted);
    let t = TaskId::new(10, 11);

    // T enters on CPU 0, migrates, and exits on CPU 1.
    s.enter(0, t, 1_000);
    assert_eq!(s.exit(1, t, 7, 0, 9_000), ExitDisposition::NoEntry);
    assert_eq!(s.total(7).count, 0);

    // The abandoned record on CPU 0 is overwritten by the next entry
    // there, and that call settles normally.
    let u = TaskId::new(12, 12);
    s.enter(0, u, 10_000);
    assert_eq!(s.exit(0, u, 8, 0, 10_400), ExitDisposition::Counted(400));
    let total = s.total(8);
    assert_eq!(total.count, 1);
    assert_eq!(total.overhead_ns, 400);
}

#[test]
fn restarted_call_counts_once() {
    let mut s = Session::new(1, FilterPolicy::Unrestricted);
    let t = TaskId::new(10, 10);

    // A signal interrupts the call; the first exit reports the internal
    // would-restart value and is dropped.
    s.enter(0, t, 1_000);
    assert_eq!(s.exit(0, t, 0, -512, 5_000), ExitDisposition::WouldRestart);
    assert_eq!(s.total(0).count, 0);

    // Userspace transparently re-executes the same call; only this leg
    // settles.
    s.enter(0, t, 5_500);
    assert_eq!(s.exit(0, t, 0, 100, 6_000), ExitDisposition::Counted(500));
    let total = s.total(0);
    assert_eq!(total.count, 1);
    assert_eq!(total.overhead_ns, 500);
}

#[test]
fn restart_block_sequence_never_counts_twice() {
    let mut s = Session::new(1, FilterPolicy::Unrestricted);
    let t = TaskId::new(10, 10);
    let nanosleep = 35;

    // Timer-style interruption: the first leg reports
    // -ERESTART_RESTARTBLOCK, the re-entry runs through
    // restart_syscall(2) and exits under the sentinel id. Both legs are
    // dropped; the logical call is undercounted, never double-counted.
    s.enter(0, t, 1_000);
    assert_eq!(
        s.exit(0, t, nanosleep, -516, 5_000),
        ExitDisposition::WouldRestart
    );

    s.enter(0, t, 5_500);
    assert_eq!(
        s.exit(0, t, RESTART_SYSCALL_ID, 0, 9_000),
        ExitDisposition::RestartSentinel
    );

    assert_eq!(s.total(nanosleep as usize).count, 0);
    assert_eq!(s.total(RESTART_SYSCALL_ID as usize).count, 0);

    // The sentinel exit leaves the armed record behind; the next entry
    // overwrites it and life goes on.
    assert!(!s.slots[0].is_vacant());
    s.enter(0, t, 10_000);
    assert_eq!(s.exit(0, t, 1, 0, 10_200), ExitDisposition::Counted(200));
}

#[test]
fn out_of_range_ids_are_ignored() {
    let mut s = Session::new(1, FilterPolicy::Unrestricted);
    let t = TaskId::new(10, 10);

    s.enter(0, t, 1_000);
    assert_eq!(
        s.exit(0, t, SYSCALL_TABLE_SIZE as i64, 0, 2_000),
        ExitDisposition::NoRow
    );
    assert_eq!(s.exit(0, t, -1, 0, 2_000), ExitDisposition::NoRow);

    // The record survives for a well-formed exit of the same task.
    assert_eq!(s.exit(0, t, 5, 0, 2_500), ExitDisposition::Counted(1_500));
}
