//! The system-wide kernel instance and its free-function surface.
//!
//! Object layers and the debug shell call these instead of threading a
//! [`Kernel`] reference around. The instance is created on first use, with
//! the capacities passed to [`init`] if that ran first.

use ucwrap_common::KernelError;
use ucwrap_hal::{InterruptController, IrqState};

use crate::config::KernelConfig;
use crate::kernel::Kernel;
use crate::list::WaitListId;

/// Interrupt controller of the system kernel.
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub type SystemIrq = crate::arch::Cpu;

/// Interrupt controller of the system kernel.
#[cfg(not(all(target_arch = "x86_64", target_os = "none")))]
pub type SystemIrq = crate::irq::HostInterrupts;

static KERNEL: spin::Once<Kernel<SystemIrq>> = spin::Once::new();

/// Initializes the system kernel.
///
/// This function is idempotent - calling it again returns the existing
/// instance and ignores `config`.
pub fn init(config: KernelConfig) -> &'static Kernel<SystemIrq> {
    KERNEL.call_once(|| {
        log::debug!(
            "kernel up: {} threads, {} wait lists",
            config.max_threads,
            config.max_wait_lists
        );
        Kernel::with_config(SystemIrq::default(), config)
    })
}

/// Returns the system kernel, initializing it with defaults if necessary.
pub fn kernel() -> &'static Kernel<SystemIrq> {
    init(KernelConfig::default())
}

/// Masks interrupts and returns the state to hand to [`interrupt_enable`].
///
/// Calls nest; only the outermost `interrupt_enable` unmasks.
pub fn interrupt_disable() -> IrqState {
    kernel().irq().disable()
}

/// Restores the interrupt state saved by [`interrupt_disable`].
pub fn interrupt_enable(state: IrqState) {
    kernel().irq().restore(state);
}

/// [`Kernel::abort_head`] on the system kernel.
///
/// # Errors
///
/// [`KernelError::NoWaiters`] if nothing waits on `list`.
pub fn abort_head(list: WaitListId) -> Result<(), KernelError> {
    kernel().abort_head(list)
}

/// [`Kernel::abort_all`] on the system kernel.
pub fn abort_all(list: WaitListId) -> usize {
    kernel().abort_all(list)
}
