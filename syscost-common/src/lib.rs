#![cfg_attr(not(feature = "user"), no_std)]

pub mod descend;
pub mod engine;
pub mod filter;
pub mod metrics;
pub mod stats;
pub mod syscall;
pub mod task_id;

pub use task_id::TaskId;

/// Number of rows in the per-CPU syscall stats table. Exit events whose id
/// falls outside the table are skipped.
pub const SYSCALL_TABLE_SIZE: u32 = 512;

/// Capacity of the follow-mode descendant set. Forks beyond this are
/// dropped: the new process simply goes untraced.
pub const DESCENDANT_CAPACITY: u32 = 4096;

/// Keys into the CONFIG map. Userspace seeds every cell before attaching
/// any program.
pub enum ConfigKey {
    FilterMode = 0,
    TargetTgid = 1,
    SelfTgid = 2,
}
