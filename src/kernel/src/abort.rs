//! Pend abort: forcibly ending the wait of threads blocked on a wait list.
//!
//! Both operations mark the head waiter inside a critical section (error
//! first, then pend status) and resume it only after interrupts are enabled
//! again, because resuming may request a context switch. The bulk variant
//! takes a fresh section per waiter and re-tests emptiness every time round,
//! so interrupt latency stays bounded by one waiter's worth of work however
//! long the list is.

use ucwrap_common::{ErrorCode, KernelError, PendStatus};
use ucwrap_hal::InterruptController;

use crate::kernel::{Kernel, KernelState};
use crate::list::WaitListId;
use crate::thread::ThreadId;

impl<I: InterruptController> Kernel<I> {
    /// Abort the wait of the thread at the head of `list`.
    ///
    /// The thread is woken with [`ErrorCode::Aborted`] in its error field,
    /// which it observes through [`Kernel::take_wait_result`].
    ///
    /// # Errors
    ///
    /// [`KernelError::NoWaiters`] if the list is empty; nothing is changed.
    ///
    /// # Panics
    ///
    /// If `list` was not created by this kernel.
    pub fn abort_head(&self, list: WaitListId) -> Result<(), KernelError> {
        let thread = self.with_state(|state| -> Result<ThreadId, KernelError> {
            let thread = state.wait_list(list).front().ok_or(KernelError::NoWaiters)?;
            state.mark_aborted(thread);
            Ok(thread)
        })?;
        self.resume_aborted(thread);
        Ok(())
    }

    /// Abort the wait of every thread on `list`, head first.
    ///
    /// Returns the number of threads this call woke. On return the list was
    /// observed empty. An empty list costs a single critical section.
    ///
    /// # Panics
    ///
    /// If `list` was not created by this kernel.
    pub fn abort_all(&self, list: WaitListId) -> usize {
        let mut aborted = 0;
        while let Some(thread) = self.with_state(|state| {
            let thread = state.wait_list(list).front()?;
            state.mark_aborted(thread);
            Some(thread)
        }) {
            if self.resume_aborted(thread) {
                aborted += 1;
            }
        }
        log::debug!("abort {list:?}: {aborted} waiter(s) released");
        aborted
    }

    /// Resume a thread marked by [`KernelState::mark_aborted`].
    ///
    /// Between marking and this call interrupts are enabled, so another
    /// context may already have woken the thread, and the thread may even
    /// have pended again. Only a wait still marked as aborted is resumed; a
    /// newer wait is left alone.
    fn resume_aborted(&self, thread: ThreadId) -> bool {
        match self.with_state(|state| state.make_ready_aborted(thread)) {
            Ok(()) => {
                log::trace!("{thread} wait aborted");
                self.irq().pend_switch();
                true
            }
            Err(KernelError::NotSuspended) => {
                log::debug!("{thread} was woken before its abort completed");
                false
            }
            Err(err) => {
                log::warn!("abort could not resume {thread}: {err}");
                false
            }
        }
    }
}

impl KernelState {
    /// Record an abort on a waiter. The thread stays linked until resumed.
    pub(crate) fn mark_aborted(&mut self, thread: ThreadId) {
        let tcb = self.threads.tcb_mut(thread);
        tcb.error = ErrorCode::Aborted;
        tcb.pend = PendStatus::PendingAbort;
    }

    /// [`KernelState::make_ready`] for a wait that is still marked aborted.
    pub(crate) fn make_ready_aborted(&mut self, thread: ThreadId) -> Result<(), KernelError> {
        let tcb = self.threads.get(thread).ok_or(KernelError::NoSuchThread)?;
        if tcb.pend != PendStatus::PendingAbort {
            return Err(KernelError::NotSuspended);
        }
        self.make_ready(thread)
    }
}
