//! System-wide error types for ucwrap.

use core::fmt;

/// Errors returned by kernel operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KernelError {
    /// The thread handle does not name a thread of this kernel.
    NoSuchThread,
    /// The thread is not waiting on anything.
    NotSuspended,
    /// The thread is already waiting on an object.
    AlreadyPending,
    /// The wait list has no waiters.
    NoWaiters,
    /// The thread table is at capacity.
    ThreadTableFull,
    /// The wait list table is at capacity.
    WaitListTableFull,
    /// The wait was aborted.
    PendAbort,
    /// The wait timed out.
    Timeout,
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::NoSuchThread => write!(f, "no such thread"),
            KernelError::NotSuspended => write!(f, "thread is not suspended"),
            KernelError::AlreadyPending => write!(f, "thread is already pending"),
            KernelError::NoWaiters => write!(f, "no threads waiting"),
            KernelError::ThreadTableFull => write!(f, "thread table full"),
            KernelError::WaitListTableFull => write!(f, "wait list table full"),
            KernelError::PendAbort => write!(f, "pend aborted"),
            KernelError::Timeout => write!(f, "pend timed out"),
        }
    }
}

/// Per-thread wait result, written by whoever ends the wait.
///
/// The raw values follow the host kernel's negative error convention, where
/// a generic failure is `-1` and a timeout `-2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i8)]
pub enum ErrorCode {
    /// The wait ended normally.
    #[default]
    Ok = 0,
    /// Generic failure, written into a waiter whose pend was aborted.
    Aborted = -1,
    /// The wait timed out.
    Timeout = -2,
}

impl ErrorCode {
    /// Raw integer value of the code.
    pub const fn raw(self) -> i32 {
        self as i8 as i32
    }

    /// Convert the code into the result a pend call reports to its caller.
    pub fn into_result(self) -> Result<(), KernelError> {
        match self {
            ErrorCode::Ok => Ok(()),
            ErrorCode::Aborted => Err(KernelError::PendAbort),
            ErrorCode::Timeout => Err(KernelError::Timeout),
        }
    }
}
