//! Wait-state vocabulary shared by the kernel and object layers.

use bitflags::bitflags;

/// Where a thread stands with respect to waiting.
///
/// Every variant except [`PendStatus::Ready`] means the thread is still
/// linked into a wait list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PendStatus {
    /// Not waiting; linked into the ready list.
    #[default]
    Ready,
    /// Blocked on an object's wait list.
    Pending,
    /// The wait timed out but the thread has not been readied yet.
    ///
    /// The kernel readies a timed-out thread in the same critical section,
    /// so it never stores this; ports that defer readying do.
    PendingTimeout,
    /// The wait was aborted; the thread stays linked until it is resumed.
    PendingAbort,
}

impl PendStatus {
    /// Returns `true` for every variant that keeps the thread on a wait list.
    pub const fn is_pending(self) -> bool {
        !matches!(self, PendStatus::Ready)
    }
}

bitflags! {
    /// Kind of object a thread is pending on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct PendOn: u8 {
        /// Semaphore.
        const SEM   = 1 << 0;
        /// Mailbox.
        const MBOX  = 1 << 1;
        /// Message queue.
        const Q     = 1 << 2;
        /// Mutual exclusion semaphore.
        const MUTEX = 1 << 4;
        /// Event flag group.
        const FLAG  = 1 << 5;
        /// Any of the above.
        const ANY   = Self::SEM.bits() | Self::MBOX.bits() | Self::Q.bits()
                    | Self::MUTEX.bits() | Self::FLAG.bits();
    }
}

/// How many waiters a pend-abort releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PendAbortOpt {
    /// Abort only the thread at the head of the wait list.
    #[default]
    Head,
    /// Abort every waiting thread.
    Broadcast,
}

/// Insertion policy of a wait list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QueueOrder {
    /// Arrival order.
    #[default]
    Fifo,
    /// Lower priority value first, arrival order among equals.
    Priority,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_variants() {
        assert!(!PendStatus::Ready.is_pending());
        assert!(PendStatus::Pending.is_pending());
        assert!(PendStatus::PendingTimeout.is_pending());
        assert!(PendStatus::PendingAbort.is_pending());
    }

    #[test]
    fn test_pend_on_any() {
        assert!(PendOn::ANY.contains(PendOn::SEM | PendOn::FLAG));
        assert!(PendOn::empty().is_empty());
    }
}
