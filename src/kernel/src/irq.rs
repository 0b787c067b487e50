//! Interrupt masking, the kernel's only lock.
//!
//! [`CriticalSection`] masks interrupts through an [`InterruptController`]
//! for as long as it lives and restores the saved state when dropped, so
//! every exit path (including `?`) unmasks. Sections nest: an inner section
//! restores the masked state the outer one left behind.
//!
//! `IrqCell` holds data that may only be touched with interrupts masked.
//! Borrowing it requires a live section, and the borrow cannot outlive it.

use core::cell::{Ref, RefCell, RefMut};
use core::marker::PhantomData;

use ucwrap_hal::{InterruptController, IrqState};

#[cfg(any(test, feature = "std"))]
pub use hosted::HostInterrupts;

/// Scoped interrupt mask.
#[must_use = "interrupts are unmasked again as soon as the section is dropped"]
pub struct CriticalSection<'a, I: InterruptController + ?Sized> {
    irq: &'a I,
    saved: Option<IrqState>,
    // Restoring must happen on the context that masked.
    _not_send: PhantomData<*const ()>,
}

impl<'a, I: InterruptController + ?Sized> CriticalSection<'a, I> {
    /// Mask interrupts until the returned guard is dropped.
    pub fn enter(irq: &'a I) -> Self {
        Self {
            saved: Some(irq.disable()),
            irq,
            _not_send: PhantomData,
        }
    }
}

impl<I: InterruptController + ?Sized> Drop for CriticalSection<'_, I> {
    fn drop(&mut self) {
        if let Some(state) = self.saved.take() {
            self.irq.restore(state);
        }
    }
}

/// Data guarded by interrupt masking.
///
/// The owner must borrow it through sections on a single controller; a
/// section on an unrelated controller excludes nothing.
pub(crate) struct IrqCell<T> {
    value: RefCell<T>,
}

// SAFETY: the owner only borrows the value through sections on one
// controller, and the `InterruptController` contract keeps every other
// context that reaches that controller out for the duration of a section.
// At most one context borrows at a time.
unsafe impl<T: Send> Sync for IrqCell<T> {}

impl<T> IrqCell<T> {
    /// Wrap `value`.
    pub(crate) const fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
        }
    }

    /// Shared access for the lifetime of the section.
    pub(crate) fn borrow<'cs, I: InterruptController + ?Sized>(
        &'cs self,
        _cs: &'cs CriticalSection<'_, I>,
    ) -> Ref<'cs, T> {
        self.value.borrow()
    }

    /// Exclusive access for the lifetime of the section.
    ///
    /// # Panics
    ///
    /// If the value is already borrowed, which means a nested section tried
    /// to reach data its caller still holds.
    pub(crate) fn borrow_mut<'cs, I: InterruptController + ?Sized>(
        &'cs self,
        _cs: &'cs CriticalSection<'_, I>,
    ) -> RefMut<'cs, T> {
        self.value.borrow_mut()
    }
}

#[cfg(any(test, feature = "std"))]
mod hosted {
    use core::cell::Cell;

    use critical_section::RestoreState;
    use ucwrap_hal::{InterruptController, IrqState};

    std::thread_local! {
        static DEPTH: Cell<usize> = const { Cell::new(0) };
        static OUTER: Cell<Option<RestoreState>> = const { Cell::new(None) };
    }

    /// Interrupt controller for hosted builds.
    ///
    /// "Masking interrupts" takes the process-wide `critical-section` lock,
    /// so sections on different OS threads exclude each other the way an
    /// ISR and a thread exclude each other on a single core. Nesting is
    /// tracked per OS thread; only the outermost section takes and releases
    /// the lock.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct HostInterrupts;

    // SAFETY: the outermost `disable` on each OS thread holds the
    // process-wide lock until the matching `restore`.
    unsafe impl InterruptController for HostInterrupts {
        fn disable(&self) -> IrqState {
            let depth = DEPTH.with(Cell::get);
            if depth == 0 {
                // SAFETY: released by the `restore` that brings this thread
                // back to depth zero.
                let saved = unsafe { critical_section::acquire() };
                OUTER.with(|outer| outer.set(Some(saved)));
            }
            DEPTH.with(|d| d.set(depth + 1));
            IrqState::new(depth)
        }

        fn restore(&self, state: IrqState) {
            let depth = state.raw();
            DEPTH.with(|d| d.set(depth));
            if depth == 0 {
                if let Some(saved) = OUTER.with(Cell::take) {
                    // SAFETY: `saved` came from this thread's outermost acquire.
                    unsafe { critical_section::release(saved) };
                }
            }
        }

        fn are_enabled(&self) -> bool {
            DEPTH.with(Cell::get) == 0
        }
    }
}
