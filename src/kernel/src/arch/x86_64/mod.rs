//! x86_64 architecture support.
//!
//! Interrupt masking through the `IF` flag of `RFLAGS`.

use ucwrap_hal::{InterruptController, IrqState};
use ::x86_64::instructions::interrupts;

/// The local CPU's interrupt flag.
///
/// The saved state records whether `IF` was set, so a section entered with
/// interrupts already masked leaves them masked on exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct Cpu;

// SAFETY: with IF clear nothing preempts the running code on this core,
// and the kernel runs on one core.
unsafe impl InterruptController for Cpu {
    #[inline]
    fn disable(&self) -> IrqState {
        let was_enabled = interrupts::are_enabled();
        if was_enabled {
            interrupts::disable();
        }
        IrqState::new(usize::from(was_enabled))
    }

    #[inline]
    fn restore(&self, state: IrqState) {
        if state.raw() != 0 {
            interrupts::enable();
        }
    }

    #[inline]
    fn are_enabled(&self) -> bool {
        interrupts::are_enabled()
    }
}
