//! Restart artifacts the exit path must ignore.
//!
//! An interrupted call can leave the kernel twice: once with an internal
//! `-ERESTART*` value while a signal is handled, and once more when it is
//! re-entered, possibly through `restart_syscall(2)`. Counting either leg
//! as a completion would overcount.

/// `restart_syscall(2)`'s number on the target architecture. With both
/// arch features enabled, aarch64 takes precedence.
#[cfg(all(feature = "x86_64", not(feature = "aarch64")))]
pub const RESTART_SYSCALL_ID: i64 = 219;
#[cfg(feature = "aarch64")]
pub const RESTART_SYSCALL_ID: i64 = 128;

pub const ERESTARTSYS: i64 = 512;
pub const ERESTARTNOINTR: i64 = 513;
pub const ERESTARTNOHAND: i64 = 514;
pub const ERESTART_RESTARTBLOCK: i64 = 516;

/// True for the kernel-internal "this call will be restarted" returns.
/// 515 (`ENOIOCTLCMD`) sits inside the same range and is not one of them.
#[inline(always)]
pub fn is_restart_return(ret: i64) -> bool {
    matches!(
        -ret,
        ERESTARTSYS | ERESTARTNOINTR | ERESTARTNOHAND | ERESTART_RESTARTBLOCK
    )
}
