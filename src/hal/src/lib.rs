//! ucwrap Hardware Abstraction Layer (HAL) traits.
//!
//! This crate defines traits that abstract away platform-specific hardware details.

#![no_std]

/// Opaque interrupt state saved by [`InterruptController::disable`].
///
/// The value is only meaningful to the controller that produced it and must
/// be handed back to that controller's [`InterruptController::restore`]
/// exactly once, in LIFO order with respect to other saved states.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a saved interrupt state leaves interrupts masked"]
pub struct IrqState(usize);

impl IrqState {
    /// Wraps a controller-specific raw state.
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the controller-specific raw state.
    pub const fn raw(&self) -> usize {
        self.0
    }
}

/// Trait for controlling interrupts.
///
/// Masking nests: a `disable` issued while interrupts are already masked
/// returns a state whose `restore` leaves them masked.
///
/// # Safety
///
/// Kernels use masking as their only lock. An implementation must guarantee
/// that from a `disable` until the matching outermost `restore`, no other
/// execution context that can reach the same controller runs. On a single
/// core that is the interrupt flag. A controller that is `Sync` and shared
/// between OS threads must provide that exclusion itself.
///
/// A controller that masks nothing cannot be implemented without `unsafe`:
///
/// ```compile_fail
/// use ucwrap_hal::{InterruptController, IrqState};
///
/// struct NoopIrq;
///
/// impl InterruptController for NoopIrq {
///     fn disable(&self) -> IrqState {
///         IrqState::new(0)
///     }
///     fn restore(&self, _state: IrqState) {}
///     fn are_enabled(&self) -> bool {
///         true
///     }
/// }
/// ```
pub unsafe trait InterruptController {
    /// Masks interrupts and returns the state to restore afterwards.
    fn disable(&self) -> IrqState;
    /// Restores the interrupt state saved by the matching `disable`.
    fn restore(&self, state: IrqState);
    /// Returns `true` when interrupts are currently unmasked.
    fn are_enabled(&self) -> bool;
    /// Requests a context switch once interrupts allow it.
    ///
    /// Ports without a deferred switch mechanism leave this empty.
    fn pend_switch(&self) {}
}

// SAFETY: every call is forwarded to `T`, which upholds the contract.
unsafe impl<T: InterruptController + ?Sized> InterruptController for &T {
    fn disable(&self) -> IrqState {
        (**self).disable()
    }

    fn restore(&self, state: IrqState) {
        (**self).restore(state);
    }

    fn are_enabled(&self) -> bool {
        (**self).are_enabled()
    }

    fn pend_switch(&self) {
        (**self).pend_switch();
    }
}
