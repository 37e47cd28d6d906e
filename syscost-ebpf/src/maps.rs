use aya_ebpf::{
    macros::map,
    maps::{HashMap, PerCpuArray},
};
use syscost_common::{
    stats::{InflightRecord, SyscallStat},
    DESCENDANT_CAPACITY, SYSCALL_TABLE_SIZE,
};

/// Session configuration cells, keyed by ConfigKey. Userspace seeds every
/// cell before attaching any program.
#[map(name = "CONFIG")]
pub static CONFIG: HashMap<u32, u64> = HashMap::with_max_entries(8, 0);

/// The measurement table: one row per syscall id, per CPU.
#[map(name = "SYSCALL_STATS")]
pub static SYSCALL_STATS: PerCpuArray<SyscallStat> =
    PerCpuArray::with_max_entries(SYSCALL_TABLE_SIZE, 0);

/// The per-CPU correlation slot pairing an entry with the exit after it.
#[map(name = "INFLIGHT")]
pub static INFLIGHT: PerCpuArray<InflightRecord> = PerCpuArray::with_max_entries(1, 0);

/// Follow-mode membership: task ids forked under the root. Only the keys
/// matter.
#[map(name = "DESCENDANTS")]
pub static DESCENDANTS: HashMap<u32, u8> = HashMap::with_max_entries(DESCENDANT_CAPACITY, 0);

/// Diagnostic counters keyed by TraceMetric, read once at shutdown.
#[map(name = "METRICS")]
pub static METRICS: HashMap<u32, u64> = HashMap::with_max_entries(8, 0);
