//! The kernel object: thread arena, wait lists and ready list behind one
//! interrupt-masked cell.

use alloc::vec::Vec;

use ucwrap_common::{KernelError, PendStatus, QueueOrder};
use ucwrap_hal::InterruptController;

use crate::config::KernelConfig;
use crate::irq::{CriticalSection, IrqCell};
use crate::list::{ListError, ListHead, ListOwner, WaitListId};
use crate::thread::{ThreadId, ThreadInfo, ThreadTable};

/// A kernel instance.
///
/// All thread and list state lives in one interrupt-guarded cell; every
/// operation takes a [`CriticalSection`] on the kernel's interrupt controller
/// before touching it. Several kernels can coexist (tests build one each).
/// Handles are plain indices: a [`ThreadId`] from another kernel is either
/// rejected as unknown or names whichever local thread has the same index.
pub struct Kernel<I: InterruptController> {
    irq: I,
    state: IrqCell<KernelState>,
}

pub(crate) struct KernelState {
    pub(crate) threads: ThreadTable,
    pub(crate) wait_lists: Vec<ListHead>,
    max_wait_lists: usize,
    pub(crate) ready: ListHead,
}

impl<I: InterruptController> Kernel<I> {
    /// Create a kernel with the default capacities.
    pub fn new(irq: I) -> Self {
        Self::with_config(irq, KernelConfig::default())
    }

    /// Create a kernel with explicit capacities.
    pub fn with_config(irq: I, config: KernelConfig) -> Self {
        Self {
            irq,
            state: IrqCell::new(KernelState {
                threads: ThreadTable::new(config.max_threads),
                wait_lists: Vec::with_capacity(config.max_wait_lists),
                max_wait_lists: config.max_wait_lists,
                ready: ListHead::new(ListOwner::Ready, QueueOrder::Fifo),
            }),
        }
    }

    /// The interrupt controller this kernel masks with.
    pub fn irq(&self) -> &I {
        &self.irq
    }

    /// Read the kernel state with interrupts masked.
    pub(crate) fn read_state<R>(&self, f: impl FnOnce(&KernelState) -> R) -> R {
        let cs = CriticalSection::enter(&self.irq);
        let state = self.state.borrow(&cs);
        f(&state)
    }

    /// Run `f` on the kernel state with interrupts masked.
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut KernelState) -> R) -> R {
        let cs = CriticalSection::enter(&self.irq);
        let mut state = self.state.borrow_mut(&cs);
        f(&mut state)
    }

    /// Add a ready thread.
    ///
    /// # Errors
    ///
    /// [`KernelError::ThreadTableFull`] once `max_threads` threads exist.
    pub fn spawn(&self, name: &'static str, priority: u8) -> Result<ThreadId, KernelError> {
        let thread = self.with_state(|state| -> Result<ThreadId, KernelError> {
            let thread = state.threads.spawn(name, priority)?;
            state.ready.push_back(&mut state.threads, thread);
            Ok(thread)
        })?;
        log::trace!("spawn {thread} '{name}' prio {priority}");
        Ok(thread)
    }

    /// Create an empty wait list.
    ///
    /// # Errors
    ///
    /// [`KernelError::WaitListTableFull`] once `max_wait_lists` lists exist.
    pub fn create_wait_list(&self, order: QueueOrder) -> Result<WaitListId, KernelError> {
        self.with_state(|state| -> Result<WaitListId, KernelError> {
            if state.wait_lists.len() >= state.max_wait_lists {
                return Err(KernelError::WaitListTableFull);
            }
            let raw = u16::try_from(state.wait_lists.len())
                .map_err(|_| KernelError::WaitListTableFull)?;
            let id = WaitListId::new(raw);
            state.wait_lists.push(ListHead::new(ListOwner::Wait(id), order));
            Ok(id)
        })
    }

    /// Snapshot of a thread's state.
    pub fn thread_info(&self, thread: ThreadId) -> Option<ThreadInfo> {
        self.read_state(|state| state.threads.get(thread).map(ThreadInfo::from))
    }

    /// Number of threads waiting on `list`.
    pub fn wait_list_len(&self, list: WaitListId) -> usize {
        self.read_state(|state| state.wait_list(list).len())
    }

    /// Returns `true` when nothing waits on `list`.
    pub fn is_empty(&self, list: WaitListId) -> bool {
        self.read_state(|state| state.wait_list(list).is_empty())
    }

    /// The thread at the head of `list`.
    pub fn head(&self, list: WaitListId) -> Option<ThreadId> {
        self.read_state(|state| state.wait_list(list).front())
    }

    /// Threads waiting on `list`, head first.
    pub fn waiters(&self, list: WaitListId) -> Vec<ThreadId> {
        self.read_state(|state| state.wait_list(list).iter(&state.threads).collect())
    }

    /// Ready threads in the order they became ready.
    pub fn ready_threads(&self) -> Vec<ThreadId> {
        self.read_state(|state| state.ready.iter(&state.threads).collect())
    }

    /// Check every list's links and every thread's pend status against its
    /// list membership.
    pub fn verify(&self) -> Result<(), ListError> {
        self.read_state(|state| state.verify())
    }
}

impl KernelState {
    /// # Panics
    ///
    /// If `list` was not created by this kernel.
    pub(crate) fn wait_list(&self, list: WaitListId) -> &ListHead {
        match self.wait_lists.get(list.index()) {
            Some(head) => head,
            None => panic!("{list:?} does not belong to this kernel"),
        }
    }

    /// Link a thread into a wait list according to the list's order.
    pub(crate) fn link_waiter(&mut self, list: WaitListId, thread: ThreadId) {
        let Some(head) = self.wait_lists.get_mut(list.index()) else {
            panic!("{list:?} does not belong to this kernel");
        };
        let before = match head.order() {
            QueueOrder::Fifo => None,
            QueueOrder::Priority => {
                let priority = self.threads.tcb(thread).priority;
                let threads = &self.threads;
                head.iter(threads)
                    .find(|&waiter| threads.tcb(waiter).priority > priority)
            }
        };
        head.insert_before(&mut self.threads, thread, before);
    }

    /// Remove a thread from whichever list holds it.
    pub(crate) fn unlink(&mut self, thread: ThreadId) {
        let owner = self.threads.tcb(thread).link.owner;
        match owner {
            Some(ListOwner::Ready) => self.ready.remove(&mut self.threads, thread),
            Some(ListOwner::Wait(list)) => {
                self.wait_lists[list.index()].remove(&mut self.threads, thread);
            }
            None => {}
        }
    }

    /// Move a pending thread from its wait list to the tail of the ready
    /// list. The error field is left for the thread to collect.
    pub(crate) fn make_ready(&mut self, thread: ThreadId) -> Result<(), KernelError> {
        let tcb = self.threads.get(thread).ok_or(KernelError::NoSuchThread)?;
        if !tcb.pend.is_pending() {
            return Err(KernelError::NotSuspended);
        }
        self.unlink(thread);
        self.threads.tcb_mut(thread).pend = PendStatus::Ready;
        self.ready.push_back(&mut self.threads, thread);
        Ok(())
    }

    fn verify(&self) -> Result<(), ListError> {
        self.ready.verify(&self.threads)?;
        for list in &self.wait_lists {
            list.verify(&self.threads)?;
        }

        for thread in self.threads.ids() {
            let tcb = self.threads.tcb(thread);
            let consistent = match tcb.link.owner {
                Some(ListOwner::Wait(_)) => tcb.pend.is_pending(),
                Some(ListOwner::Ready) => !tcb.pend.is_pending(),
                None => false,
            };
            if !consistent {
                return Err(ListError::StatusMismatch { thread });
            }
        }

        // Every thread is on exactly one list.
        let threads = self.threads.ids().count();
        let on_lists = self.ready.len() + self.wait_lists.iter().map(ListHead::len).sum::<usize>();
        if threads != on_lists {
            return Err(ListError::LengthMismatch {
                list: ListOwner::Ready,
                expected: threads,
                found: on_lists,
            });
        }
        Ok(())
    }
}
