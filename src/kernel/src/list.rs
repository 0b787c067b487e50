//! Intrusive doubly-linked lists threaded through the thread arena.
//!
//! A list only stores its head, tail and length. The `prev`/`next` links live
//! in each thread's control block and name neighbours by [`ThreadId`], so
//! unlinking any thread is O(1) and no list ever allocates.

use core::fmt;

use ucwrap_common::QueueOrder;

use crate::thread::ThreadId;

/// Handle of a wait list owned by a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WaitListId(u16);

impl WaitListId {
    pub(crate) const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Position of the list in the kernel's list table.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The list a link belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOwner {
    /// The scheduler's ready list.
    Ready,
    /// An object's wait list.
    Wait(WaitListId),
}

/// Per-thread list membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Link {
    pub(crate) prev: Option<ThreadId>,
    pub(crate) next: Option<ThreadId>,
    pub(crate) owner: Option<ListOwner>,
}

/// Storage that holds the links of list entries.
pub(crate) trait LinkTable {
    fn link(&self, id: ThreadId) -> &Link;
    fn link_mut(&mut self, id: ThreadId) -> &mut Link;
}

/// Structural defect found by [`ListHead::verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListError {
    /// An entry's `prev` does not name the entry before it.
    BrokenLink {
        /// List being walked.
        list: ListOwner,
        /// Entry with the bad back link.
        at: ThreadId,
    },
    /// An entry is reachable from a list it does not claim to belong to.
    WrongOwner {
        /// List being walked.
        list: ListOwner,
        /// Entry with the mismatched owner.
        at: ThreadId,
    },
    /// Walking the list found a different number of entries than recorded.
    LengthMismatch {
        /// List being walked.
        list: ListOwner,
        /// Recorded length.
        expected: usize,
        /// Entries reached.
        found: usize,
    },
    /// The recorded tail is not the last entry reached.
    BadTail {
        /// List being walked.
        list: ListOwner,
    },
    /// A thread's pend status disagrees with the list it is linked into.
    StatusMismatch {
        /// Offending thread.
        thread: ThreadId,
    },
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListError::BrokenLink { list, at } => write!(f, "{list:?}: broken back link at {at}"),
            ListError::WrongOwner { list, at } => write!(f, "{list:?}: {at} claims another list"),
            ListError::LengthMismatch {
                list,
                expected,
                found,
            } => write!(f, "{list:?}: expected {expected} entries, found {found}"),
            ListError::BadTail { list } => write!(f, "{list:?}: tail is not the last entry"),
            ListError::StatusMismatch { thread } => {
                write!(f, "{thread}: pend status disagrees with list membership")
            }
        }
    }
}

/// Head of an intrusive list.
#[derive(Debug)]
pub(crate) struct ListHead {
    owner: ListOwner,
    order: QueueOrder,
    head: Option<ThreadId>,
    tail: Option<ThreadId>,
    len: usize,
}

impl ListHead {
    pub(crate) const fn new(owner: ListOwner, order: QueueOrder) -> Self {
        Self {
            owner,
            order,
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn front(&self) -> Option<ThreadId> {
        self.head
    }

    pub(crate) fn order(&self) -> QueueOrder {
        self.order
    }

    pub(crate) fn push_back<T: LinkTable>(&mut self, table: &mut T, id: ThreadId) {
        self.insert_before(table, id, None);
    }

    /// Link `id` in front of `before`, or at the tail when `before` is `None`.
    pub(crate) fn insert_before<T: LinkTable>(
        &mut self,
        table: &mut T,
        id: ThreadId,
        before: Option<ThreadId>,
    ) {
        debug_assert!(table.link(id).owner.is_none(), "{id} is already linked");

        let prev = match before {
            Some(next) => table.link(next).prev,
            None => self.tail,
        };
        *table.link_mut(id) = Link {
            prev,
            next: before,
            owner: Some(self.owner),
        };
        match prev {
            Some(prev) => table.link_mut(prev).next = Some(id),
            None => self.head = Some(id),
        }
        match before {
            Some(next) => table.link_mut(next).prev = Some(id),
            None => self.tail = Some(id),
        }
        self.len += 1;
    }

    pub(crate) fn remove<T: LinkTable>(&mut self, table: &mut T, id: ThreadId) {
        debug_assert_eq!(table.link(id).owner, Some(self.owner), "{id} is not on this list");

        let Link { prev, next, .. } = core::mem::take(table.link_mut(id));
        match prev {
            Some(prev) => table.link_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => table.link_mut(next).prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    pub(crate) fn iter<'a, T: LinkTable>(&self, table: &'a T) -> Iter<'a, T> {
        Iter {
            table,
            next: self.head,
        }
    }

    /// Walk the list and check every link against its neighbours.
    ///
    /// The walk stops after `len + 1` steps, so a cycle is reported as a
    /// length mismatch instead of hanging.
    pub(crate) fn verify<T: LinkTable>(&self, table: &T) -> Result<(), ListError> {
        let list = self.owner;
        let mut prev = None;
        let mut found = 0;
        let mut cursor = self.head;

        while let Some(id) = cursor {
            if found > self.len {
                break;
            }
            let link = table.link(id);
            if link.owner != Some(list) {
                return Err(ListError::WrongOwner { list, at: id });
            }
            if link.prev != prev {
                return Err(ListError::BrokenLink { list, at: id });
            }
            prev = Some(id);
            cursor = link.next;
            found += 1;
        }

        if found != self.len {
            return Err(ListError::LengthMismatch {
                list,
                expected: self.len,
                found,
            });
        }
        if prev != self.tail {
            return Err(ListError::BadTail { list });
        }
        Ok(())
    }
}

/// Front-to-back iterator over a list's entries.
pub(crate) struct Iter<'a, T> {
    table: &'a T,
    next: Option<ThreadId>,
}

impl<T: LinkTable> Iterator for Iter<'_, T> {
    type Item = ThreadId;

    fn next(&mut self) -> Option<ThreadId> {
        let id = self.next?;
        self.next = self.table.link(id).next;
        Some(id)
    }
}
