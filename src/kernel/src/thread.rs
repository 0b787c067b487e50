//! Thread control blocks and the arena that owns them.
//!
//! Threads are never moved or freed once spawned, so a [`ThreadId`] stays
//! valid for the life of the kernel and can be stored in list links instead
//! of pointers.

use alloc::vec::Vec;
use core::fmt;

use ucwrap_common::{ErrorCode, KernelError, PendOn, PendStatus};

use crate::list::{Link, LinkTable};

/// Handle of a thread in a kernel's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(u16);

impl ThreadId {
    pub(crate) const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Position of the thread in the arena.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "thread#{}", self.0)
    }
}

/// Thread control block.
#[derive(Debug)]
pub(crate) struct Tcb {
    pub(crate) name: &'static str,
    /// Lower value runs first.
    pub(crate) priority: u8,
    pub(crate) pend: PendStatus,
    pub(crate) pend_on: PendOn,
    pub(crate) error: ErrorCode,
    pub(crate) link: Link,
}

/// Copy of a thread's externally visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadInfo {
    /// Name given at spawn.
    pub name: &'static str,
    /// Priority given at spawn; lower value runs first.
    pub priority: u8,
    /// Where the thread stands with respect to waiting.
    pub pend: PendStatus,
    /// Kind of object the thread pended on last.
    pub pend_on: PendOn,
    /// Result of the last wait, until the thread collects it.
    pub error: ErrorCode,
}

impl From<&Tcb> for ThreadInfo {
    fn from(tcb: &Tcb) -> Self {
        Self {
            name: tcb.name,
            priority: tcb.priority,
            pend: tcb.pend,
            pend_on: tcb.pend_on,
            error: tcb.error,
        }
    }
}

/// Fixed-capacity arena of thread control blocks.
pub(crate) struct ThreadTable {
    threads: Vec<Tcb>,
    capacity: usize,
}

impl ThreadTable {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            threads: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a thread in the ready state. It is not linked anywhere yet.
    pub(crate) fn spawn(&mut self, name: &'static str, priority: u8) -> Result<ThreadId, KernelError> {
        if self.threads.len() >= self.capacity {
            return Err(KernelError::ThreadTableFull);
        }
        let id = u16::try_from(self.threads.len()).map_err(|_| KernelError::ThreadTableFull)?;
        self.threads.push(Tcb {
            name,
            priority,
            pend: PendStatus::Ready,
            pend_on: PendOn::empty(),
            error: ErrorCode::Ok,
            link: Link::default(),
        });
        Ok(ThreadId::new(id))
    }

    pub(crate) fn get(&self, id: ThreadId) -> Option<&Tcb> {
        self.threads.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: ThreadId) -> Option<&mut Tcb> {
        self.threads.get_mut(id.index())
    }

    /// Projects a list entry onto its control block.
    ///
    /// List entries only ever hold ids minted by this table; a miss means the
    /// lists are corrupt.
    pub(crate) fn tcb(&self, id: ThreadId) -> &Tcb {
        match self.threads.get(id.index()) {
            Some(tcb) => tcb,
            None => panic!("list entry {id} has no control block"),
        }
    }

    pub(crate) fn tcb_mut(&mut self, id: ThreadId) -> &mut Tcb {
        match self.threads.get_mut(id.index()) {
            Some(tcb) => tcb,
            None => panic!("list entry {id} has no control block"),
        }
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = ThreadId> + '_ {
        // `spawn` caps the table at u16::MAX + 1 entries.
        (0..self.threads.len()).map(|index| ThreadId::new(index as u16))
    }
}

impl LinkTable for ThreadTable {
    fn link(&self, id: ThreadId) -> &Link {
        &self.tcb(id).link
    }

    fn link_mut(&mut self, id: ThreadId) -> &mut Link {
        &mut self.tcb_mut(id).link
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_assigns_sequential_ids() {
        let mut table = ThreadTable::new(4);
        let a = table.spawn("a", 1).unwrap();
        let b = table.spawn("b", 2).unwrap();

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(table.tcb(b).name, "b");
        assert_eq!(table.tcb(a).pend, PendStatus::Ready);
        assert_eq!(table.ids().count(), 2);
    }

    #[test]
    fn test_spawn_respects_capacity() {
        let mut table = ThreadTable::new(1);
        assert!(table.spawn("a", 0).is_ok());
        assert_eq!(table.spawn("b", 0), Err(KernelError::ThreadTableFull));
    }

    #[test]
    fn test_get_unknown_thread() {
        let table = ThreadTable::new(1);
        assert!(table.get(ThreadId(3)).is_none());
    }

    #[test]
    #[should_panic(expected = "has no control block")]
    fn test_projection_of_foreign_entry_panics() {
        let table = ThreadTable::new(1);
        let _ = table.tcb(ThreadId(0));
    }

    #[test]
    fn test_thread_id_display() {
        assert_eq!(alloc::format!("{}", ThreadId(7)), "thread#7");
    }
}
