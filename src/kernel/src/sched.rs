//! Transitions between the ready list and wait lists.
//!
//! Scheduling policy is not decided here: the ready list is FIFO and the only
//! scheduling side effect is asking the interrupt controller to pend a
//! context switch whenever a thread becomes ready.

use ucwrap_common::{ErrorCode, KernelError, PendOn, PendStatus};
use ucwrap_hal::InterruptController;

use crate::kernel::Kernel;
use crate::list::WaitListId;
use crate::thread::ThreadId;

impl<I: InterruptController> Kernel<I> {
    /// Move a waiting thread to the ready list.
    ///
    /// Takes its own short critical section, so callers must not hold one
    /// across the call if they want the switch request to take effect
    /// promptly.
    ///
    /// # Errors
    ///
    /// - [`KernelError::NoSuchThread`] for a handle from another kernel.
    /// - [`KernelError::NotSuspended`] if the thread is not on a wait list,
    ///   for instance because another context already resumed it.
    pub fn resume(&self, thread: ThreadId) -> Result<(), KernelError> {
        self.with_state(|state| state.make_ready(thread))?;
        log::trace!("resume {thread}");
        self.irq().pend_switch();
        Ok(())
    }

    /// Block a ready thread on `list`.
    ///
    /// The thread leaves the ready list and is linked into `list` in the
    /// list's order, with its error field cleared.
    ///
    /// # Errors
    ///
    /// - [`KernelError::NoSuchThread`] for a handle from another kernel.
    /// - [`KernelError::AlreadyPending`] if the thread already waits.
    pub fn suspend_on(
        &self,
        thread: ThreadId,
        list: WaitListId,
        pend_on: PendOn,
    ) -> Result<(), KernelError> {
        self.with_state(|state| -> Result<(), KernelError> {
            // Reject foreign lists before touching the thread.
            state.wait_list(list);
            let tcb = state.threads.get_mut(thread).ok_or(KernelError::NoSuchThread)?;
            if tcb.pend.is_pending() {
                return Err(KernelError::AlreadyPending);
            }
            tcb.error = ErrorCode::Ok;
            tcb.pend_on = pend_on;
            state.unlink(thread);
            state.threads.tcb_mut(thread).pend = PendStatus::Pending;
            state.link_waiter(list, thread);
            Ok(())
        })?;
        log::trace!("{thread} pends on {list:?} ({pend_on:?})");
        Ok(())
    }

    /// Wake the head of `list` as a normal signal would.
    ///
    /// Unlinking and readying happen inside one critical section. A waiter
    /// that an abort has already marked keeps its abort result.
    pub fn signal_head(&self, list: WaitListId) -> Option<ThreadId> {
        let thread = self.with_state(|state| {
            let thread = state.wait_list(list).front()?;
            let tcb = state.threads.tcb_mut(thread);
            if tcb.pend == PendStatus::Pending {
                tcb.error = ErrorCode::Ok;
            }
            state.make_ready(thread).ok()?;
            Some(thread)
        })?;
        log::trace!("signal {list:?}: woke {thread}");
        self.irq().pend_switch();
        Some(thread)
    }

    /// End a thread's wait with a timeout.
    ///
    /// The error is written and the thread readied in one critical section,
    /// so no other context sees the wait half finished.
    ///
    /// # Errors
    ///
    /// - [`KernelError::NoSuchThread`] for a handle from another kernel.
    /// - [`KernelError::NotSuspended`] unless the thread is plainly
    ///   [`PendStatus::Pending`]; a wait already being aborted cannot also
    ///   time out.
    pub fn time_out(&self, thread: ThreadId) -> Result<(), KernelError> {
        self.with_state(|state| -> Result<(), KernelError> {
            let tcb = state.threads.get_mut(thread).ok_or(KernelError::NoSuchThread)?;
            if tcb.pend != PendStatus::Pending {
                return Err(KernelError::NotSuspended);
            }
            tcb.error = ErrorCode::Timeout;
            state.make_ready(thread)
        })?;
        log::trace!("{thread} timed out");
        self.irq().pend_switch();
        Ok(())
    }

    /// Collect the result of a finished wait, as the woken thread does.
    ///
    /// The error field is reset to [`ErrorCode::Ok`], so a second call
    /// reports `Ok`.
    ///
    /// # Errors
    ///
    /// - [`KernelError::NoSuchThread`] for a handle from another kernel.
    /// - [`KernelError::AlreadyPending`] while the thread is still waiting.
    pub fn take_wait_result(&self, thread: ThreadId) -> Result<ErrorCode, KernelError> {
        self.with_state(|state| -> Result<ErrorCode, KernelError> {
            let tcb = state.threads.get_mut(thread).ok_or(KernelError::NoSuchThread)?;
            if tcb.pend.is_pending() {
                return Err(KernelError::AlreadyPending);
            }
            tcb.pend_on = PendOn::empty();
            Ok(core::mem::take(&mut tcb.error))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::CountingIrq;
    use alloc::vec;
    use ucwrap_common::QueueOrder;

    fn kernel() -> Kernel<CountingIrq> {
        Kernel::new(CountingIrq::default())
    }

    #[test]
    fn test_suspend_fifo_order() {
        let kernel = kernel();
        let list = kernel.create_wait_list(QueueOrder::Fifo).unwrap();
        let a = kernel.spawn("a", 5).unwrap();
        let b = kernel.spawn("b", 1).unwrap();

        kernel.suspend_on(a, list, PendOn::SEM).unwrap();
        kernel.suspend_on(b, list, PendOn::SEM).unwrap();

        assert_eq!(kernel.waiters(list), vec![a, b]);
        assert!(kernel.ready_threads().is_empty());
        assert_eq!(kernel.thread_info(a).unwrap().pend, PendStatus::Pending);
        assert_eq!(kernel.thread_info(a).unwrap().pend_on, PendOn::SEM);
        assert!(kernel.verify().is_ok());
    }

    #[test]
    fn test_suspend_priority_order() {
        let kernel = kernel();
        let list = kernel.create_wait_list(QueueOrder::Priority).unwrap();
        let low = kernel.spawn("low", 9).unwrap();
        let high = kernel.spawn("high", 1).unwrap();
        let mid = kernel.spawn("mid", 5).unwrap();
        let mid2 = kernel.spawn("mid2", 5).unwrap();

        for thread in [low, high, mid, mid2] {
            kernel.suspend_on(thread, list, PendOn::MUTEX).unwrap();
        }

        assert_eq!(kernel.waiters(list), vec![high, mid, mid2, low]);
        assert!(kernel.verify().is_ok());
    }

    #[test]
    fn test_suspend_twice_is_rejected() {
        let kernel = kernel();
        let list = kernel.create_wait_list(QueueOrder::Fifo).unwrap();
        let a = kernel.spawn("a", 0).unwrap();

        kernel.suspend_on(a, list, PendOn::Q).unwrap();
        assert_eq!(kernel.suspend_on(a, list, PendOn::Q), Err(KernelError::AlreadyPending));
        assert_eq!(kernel.wait_list_len(list), 1);
    }

    #[test]
    fn test_resume_moves_to_ready_and_requests_switch() {
        let kernel = kernel();
        let list = kernel.create_wait_list(QueueOrder::Fifo).unwrap();
        let a = kernel.spawn("a", 0).unwrap();
        kernel.suspend_on(a, list, PendOn::SEM).unwrap();

        kernel.resume(a).unwrap();

        assert!(kernel.is_empty(list));
        assert_eq!(kernel.ready_threads(), vec![a]);
        assert_eq!(kernel.thread_info(a).unwrap().pend, PendStatus::Ready);
        assert_eq!(kernel.irq().switches(), 1);
        assert_eq!(kernel.irq().masked_switches(), 0);
    }

    #[test]
    fn test_resume_of_ready_thread_fails() {
        let kernel = kernel();
        let a = kernel.spawn("a", 0).unwrap();

        assert_eq!(kernel.resume(a), Err(KernelError::NotSuspended));
        assert_eq!(kernel.ready_threads(), vec![a]);
        assert_eq!(kernel.irq().switches(), 0);
    }

    #[test]
    fn test_signal_head_wakes_with_ok() {
        let kernel = kernel();
        let list = kernel.create_wait_list(QueueOrder::Fifo).unwrap();
        let a = kernel.spawn("a", 0).unwrap();
        let b = kernel.spawn("b", 0).unwrap();
        kernel.suspend_on(a, list, PendOn::MBOX).unwrap();
        kernel.suspend_on(b, list, PendOn::MBOX).unwrap();

        assert_eq!(kernel.signal_head(list), Some(a));
        assert_eq!(kernel.waiters(list), vec![b]);
        assert_eq!(kernel.take_wait_result(a), Ok(ErrorCode::Ok));
        assert_eq!(kernel.signal_head(list), Some(b));
        assert_eq!(kernel.signal_head(list), None);
    }

    #[test]
    fn test_time_out_reports_timeout() {
        let kernel = kernel();
        let list = kernel.create_wait_list(QueueOrder::Fifo).unwrap();
        let a = kernel.spawn("a", 0).unwrap();
        kernel.suspend_on(a, list, PendOn::FLAG).unwrap();

        kernel.time_out(a).unwrap();

        assert!(kernel.is_empty(list));
        assert_eq!(kernel.thread_info(a).unwrap().pend, PendStatus::Ready);
        assert_eq!(kernel.take_wait_result(a), Ok(ErrorCode::Timeout));
        assert_eq!(kernel.time_out(a), Err(KernelError::NotSuspended));
    }

    #[test]
    fn test_time_out_readies_in_one_section() {
        let kernel = kernel();
        let list = kernel.create_wait_list(QueueOrder::Fifo).unwrap();
        let a = kernel.spawn("a", 0).unwrap();
        kernel.suspend_on(a, list, PendOn::SEM).unwrap();
        kernel.irq().reset();

        kernel.time_out(a).unwrap();

        assert_eq!(kernel.irq().disables(), 1);
        let info = kernel.thread_info(a).unwrap();
        assert_eq!(info.pend, PendStatus::Ready);
        assert_eq!(info.error, ErrorCode::Timeout);
        assert!(kernel.verify().is_ok());
    }

    #[test]
    fn test_take_wait_result_resets() {
        let kernel = kernel();
        let list = kernel.create_wait_list(QueueOrder::Fifo).unwrap();
        let a = kernel.spawn("a", 0).unwrap();
        kernel.suspend_on(a, list, PendOn::SEM).unwrap();

        assert_eq!(kernel.take_wait_result(a), Err(KernelError::AlreadyPending));
        kernel.time_out(a).unwrap();
        assert_eq!(kernel.take_wait_result(a), Ok(ErrorCode::Timeout));
        assert_eq!(kernel.take_wait_result(a), Ok(ErrorCode::Ok));
        assert_eq!(kernel.thread_info(a).unwrap().pend_on, PendOn::empty());
    }
}
