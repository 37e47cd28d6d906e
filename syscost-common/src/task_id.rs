/// The packed word returned by `bpf_get_current_pid_tgid()`: thread group
/// id (the process, in userland terms) in the high half, thread id in the
/// low half.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TaskId(u64);

impl TaskId {
    /// The vacant marker. Task 0 is the idle task and never exits a
    /// syscall, so no real event carries it.
    pub const EMPTY: TaskId = TaskId(0);

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn new(tgid: u32, pid: u32) -> Self {
        Self((tgid as u64) << 32 | pid as u64)
    }

    #[inline(always)]
    pub fn tgid(&self) -> u32 {
        (self.0 >> 32) as _
    }

    #[inline(always)]
    pub fn pid(&self) -> u32 {
        (self.0 & 0xffffffff) as _
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl core::fmt::Debug for TaskId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("TaskId")
            .field(&self.tgid())
            .field(&self.pid())
            .finish()
    }
}
