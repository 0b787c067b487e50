//! Waitable kernel objects.
//!
//! Every object a thread can block on owns exactly one wait list. The
//! [`Waitable`] trait exposes that list so pend and pend-abort work the same
//! way for semaphores, mailboxes, queues, mutexes and flag groups. Counts,
//! messages and ownership are the business of the object layers built on top.

use core::fmt;

use ucwrap_common::{KernelError, PendAbortOpt, PendOn, QueueOrder};
use ucwrap_hal::InterruptController;

use crate::kernel::Kernel;
use crate::list::WaitListId;
use crate::thread::ThreadId;

/// An object threads can wait on.
pub trait Waitable {
    /// The object's wait list.
    fn wait_list(&self) -> WaitListId;

    /// Recorded in a waiter's control block while it pends.
    fn pend_on(&self) -> PendOn;

    /// Name for diagnostics.
    fn name(&self) -> &str;
}

/// Kind of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Counting semaphore.
    Semaphore,
    /// Single-message mailbox.
    Mailbox,
    /// Message queue.
    Queue,
    /// Mutual exclusion semaphore.
    Mutex,
}

impl EventType {
    /// The pend flag a waiter on this kind of event carries.
    pub const fn pend_on(self) -> PendOn {
        match self {
            EventType::Semaphore => PendOn::SEM,
            EventType::Mailbox => PendOn::MBOX,
            EventType::Queue => PendOn::Q,
            EventType::Mutex => PendOn::MUTEX,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Semaphore => write!(f, "semaphore"),
            EventType::Mailbox => write!(f, "mailbox"),
            EventType::Queue => write!(f, "queue"),
            EventType::Mutex => write!(f, "mutex"),
        }
    }
}

/// Semaphore, mailbox, queue or mutex: the part every event kind shares.
#[derive(Debug)]
pub struct Event {
    kind: EventType,
    name: &'static str,
    wait_list: WaitListId,
}

impl Event {
    /// Kind of the event.
    pub fn kind(&self) -> EventType {
        self.kind
    }
}

impl Waitable for Event {
    fn wait_list(&self) -> WaitListId {
        self.wait_list
    }

    fn pend_on(&self) -> PendOn {
        self.kind.pend_on()
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Event flag group.
#[derive(Debug)]
pub struct FlagGroup {
    name: &'static str,
    wait_list: WaitListId,
}

impl Waitable for FlagGroup {
    fn wait_list(&self) -> WaitListId {
        self.wait_list
    }

    fn pend_on(&self) -> PendOn {
        PendOn::FLAG
    }

    fn name(&self) -> &str {
        self.name
    }
}

impl<I: InterruptController> Kernel<I> {
    /// Create an event with an empty wait list.
    ///
    /// # Errors
    ///
    /// [`KernelError::WaitListTableFull`] when no wait list is left.
    pub fn create_event(
        &self,
        kind: EventType,
        name: &'static str,
        order: QueueOrder,
    ) -> Result<Event, KernelError> {
        let wait_list = self.create_wait_list(order)?;
        log::trace!("create {kind} '{name}' on {wait_list:?}");
        Ok(Event {
            kind,
            name,
            wait_list,
        })
    }

    /// Create an event flag group with an empty wait list.
    ///
    /// # Errors
    ///
    /// [`KernelError::WaitListTableFull`] when no wait list is left.
    pub fn create_flag_group(
        &self,
        name: &'static str,
        order: QueueOrder,
    ) -> Result<FlagGroup, KernelError> {
        let wait_list = self.create_wait_list(order)?;
        log::trace!("create flag group '{name}' on {wait_list:?}");
        Ok(FlagGroup { name, wait_list })
    }

    /// Block `thread` on `object`.
    ///
    /// # Errors
    ///
    /// As [`Kernel::suspend_on`].
    pub fn pend(&self, thread: ThreadId, object: &dyn Waitable) -> Result<(), KernelError> {
        self.suspend_on(thread, object.wait_list(), object.pend_on())
    }

    /// Abort the waits on `object` and return how many threads were woken.
    ///
    /// [`PendAbortOpt::Head`] releases at most one waiter,
    /// [`PendAbortOpt::Broadcast`] all of them. Zero means nobody was
    /// waiting.
    pub fn pend_abort(&self, object: &dyn Waitable, opt: PendAbortOpt) -> usize {
        let list = object.wait_list();
        let aborted = match opt {
            PendAbortOpt::Head => usize::from(self.abort_head(list).is_ok()),
            PendAbortOpt::Broadcast => self.abort_all(list),
        };
        log::debug!("pend abort '{}' ({opt:?}): {aborted}", object.name());
        aborted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::CountingIrq;
    use alloc::vec;
    use ucwrap_common::{ErrorCode, PendStatus};

    #[test]
    fn test_event_type_pend_flags() {
        assert_eq!(EventType::Semaphore.pend_on(), PendOn::SEM);
        assert_eq!(EventType::Mailbox.pend_on(), PendOn::MBOX);
        assert_eq!(EventType::Queue.pend_on(), PendOn::Q);
        assert_eq!(EventType::Mutex.pend_on(), PendOn::MUTEX);
        assert!(PendOn::ANY.contains(EventType::Mutex.pend_on()));
    }

    #[test]
    fn test_pend_records_object_kind() {
        let kernel = Kernel::new(CountingIrq::default());
        let mbox = kernel
            .create_event(EventType::Mailbox, "mbox", QueueOrder::Fifo)
            .unwrap();
        let flags = kernel.create_flag_group("flags", QueueOrder::Fifo).unwrap();
        let a = kernel.spawn("a", 0).unwrap();
        let b = kernel.spawn("b", 0).unwrap();

        kernel.pend(a, &mbox).unwrap();
        kernel.pend(b, &flags).unwrap();

        assert_eq!(mbox.kind(), EventType::Mailbox);
        assert_eq!(kernel.thread_info(a).unwrap().pend_on, PendOn::MBOX);
        assert_eq!(kernel.thread_info(b).unwrap().pend_on, PendOn::FLAG);
        assert_eq!(kernel.waiters(mbox.wait_list()), vec![a]);
        assert_eq!(kernel.waiters(flags.wait_list()), vec![b]);
    }

    #[test]
    fn test_pend_abort_head() {
        let kernel = Kernel::new(CountingIrq::default());
        let sem = kernel
            .create_event(EventType::Semaphore, "sem", QueueOrder::Fifo)
            .unwrap();
        let a = kernel.spawn("a", 0).unwrap();
        let b = kernel.spawn("b", 0).unwrap();
        kernel.pend(a, &sem).unwrap();
        kernel.pend(b, &sem).unwrap();

        assert_eq!(kernel.pend_abort(&sem, PendAbortOpt::Head), 1);

        assert_eq!(kernel.waiters(sem.wait_list()), vec![b]);
        let result = kernel.take_wait_result(a).unwrap();
        assert_eq!(result, ErrorCode::Aborted);
        assert_eq!(result.into_result(), Err(KernelError::PendAbort));
        assert_eq!(kernel.thread_info(b).unwrap().pend, PendStatus::Pending);
    }

    #[test]
    fn test_pend_abort_broadcast_on_any_waitable() {
        let kernel = Kernel::new(CountingIrq::default());
        let queue = kernel
            .create_event(EventType::Queue, "queue", QueueOrder::Priority)
            .unwrap();
        let flags = kernel.create_flag_group("flags", QueueOrder::Fifo).unwrap();
        for name in ["a", "b", "c"] {
            let thread = kernel.spawn(name, 4).unwrap();
            kernel.pend(thread, &queue).unwrap();
        }
        let f = kernel.spawn("f", 4).unwrap();
        kernel.pend(f, &flags).unwrap();

        let objects: [&dyn Waitable; 2] = [&queue, &flags];
        let aborted: usize = objects
            .iter()
            .map(|object| kernel.pend_abort(*object, PendAbortOpt::Broadcast))
            .sum();

        assert_eq!(aborted, 4);
        assert!(kernel.is_empty(queue.wait_list()));
        assert!(kernel.is_empty(flags.wait_list()));
        assert!(kernel.verify().is_ok());
    }

    #[test]
    fn test_pend_abort_without_waiters() {
        let kernel = Kernel::new(CountingIrq::default());
        let mutex = kernel
            .create_event(EventType::Mutex, "mutex", QueueOrder::Priority)
            .unwrap();

        assert_eq!(kernel.pend_abort(&mutex, PendAbortOpt::Head), 0);
        assert_eq!(kernel.pend_abort(&mutex, PendAbortOpt::Broadcast), 0);
    }
}
