//! Test infrastructure for the ucwrap kernel.
//!
//! [`CountingIrq`] is a single-context interrupt controller that records how
//! the kernel masks interrupts, so tests can assert on critical-section
//! discipline as well as on list state.

use core::cell::Cell;

use ucwrap_hal::{InterruptController, IrqState};

/// Interrupt controller that counts masking and switch requests.
#[derive(Debug, Default)]
pub struct CountingIrq {
    depth: Cell<usize>,
    max_depth: Cell<usize>,
    disables: Cell<usize>,
    switches: Cell<usize>,
    masked_switches: Cell<usize>,
}

impl CountingIrq {
    /// Current nesting depth; zero means interrupts are enabled.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Deepest nesting seen since the last [`CountingIrq::reset`].
    pub fn max_depth(&self) -> usize {
        self.max_depth.get()
    }

    /// Number of `disable` calls since the last reset.
    pub fn disables(&self) -> usize {
        self.disables.get()
    }

    /// Number of context switch requests since the last reset.
    pub fn switches(&self) -> usize {
        self.switches.get()
    }

    /// Switch requests issued while interrupts were masked.
    pub fn masked_switches(&self) -> usize {
        self.masked_switches.get()
    }

    /// Clear the counters, keeping the current depth.
    pub fn reset(&self) {
        self.max_depth.set(self.depth.get());
        self.disables.set(0);
        self.switches.set(0);
        self.masked_switches.set(0);
    }
}

// SAFETY: `CountingIrq` is not `Sync`, so only the context that owns it can
// reach it.
unsafe impl InterruptController for CountingIrq {
    fn disable(&self) -> IrqState {
        let depth = self.depth.get();
        self.depth.set(depth + 1);
        self.max_depth.set(self.max_depth.get().max(depth + 1));
        self.disables.set(self.disables.get() + 1);
        IrqState::new(depth)
    }

    fn restore(&self, state: IrqState) {
        self.depth.set(state.raw());
    }

    fn are_enabled(&self) -> bool {
        self.depth.get() == 0
    }

    fn pend_switch(&self) {
        self.switches.set(self.switches.get() + 1);
        if self.depth.get() != 0 {
            self.masked_switches.set(self.masked_switches.get() + 1);
        }
    }
}
