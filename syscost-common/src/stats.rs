use crate::task_id::TaskId;

/// One row of the per-CPU syscall table: completions settled on this CPU
/// and the nanoseconds spent inside them.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyscallStat {
    pub count: u64,
    pub overhead_ns: u64,
}

impl SyscallStat {
    /// Fold one settled call into the row.
    #[inline(always)]
    pub fn record(&mut self, elapsed_ns: u64) {
        self.count += 1;
        self.overhead_ns += elapsed_ns;
    }

    /// Fold in the same syscall's row from another CPU.
    pub fn merge(&mut self, other: &SyscallStat) {
        self.count += other.count;
        self.overhead_ns += other.overhead_ns;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0 && self.overhead_ns == 0
    }
}

#[cfg(feature = "user")]
unsafe impl aya::Pod for SyscallStat {}

/// The single correlation slot of one CPU: which task entered the kernel
/// here and when. `owner == TaskId::EMPTY` marks a vacant slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct InflightRecord {
    pub owner: TaskId,
    pub started_ns: u64,
}

impl InflightRecord {
    /// Take the slot, overwriting whatever is here. A record still present
    /// belongs to a call whose exit will never be counted.
    #[inline(always)]
    pub fn arm(&mut self, owner: TaskId, now_ns: u64) {
        self.owner = owner;
        self.started_ns = now_ns;
    }

    #[inline(always)]
    pub fn clear(&mut self) {
        *self = InflightRecord::default();
    }

    #[inline(always)]
    pub fn is_vacant(&self) -> bool {
        self.owner.is_empty()
    }

    #[inline(always)]
    pub fn owned_by(&self, task: TaskId) -> bool {
        self.owner == task
    }

    /// Nanoseconds since the slot was armed, saturating on clock steps.
    #[inline(always)]
    pub fn elapsed_ns(&self, now_ns: u64) -> u64 {
        now_ns.saturating_sub(self.started_ns)
    }
}
