//! ucwrap Kernel
//!
//! The wait-queue core of a small preemptive kernel: a thread arena, wait
//! lists threaded through it, and the transitions that move threads between
//! waiting and ready. Its centrepiece is pend abort, which forcibly ends the
//! wait of one ([`Kernel::abort_head`]) or every ([`Kernel::abort_all`])
//! thread blocked on an object.
//!
//! # Architecture
//!
//! The kernel is structured into the following modules:
//! - `irq`: interrupt masking as a scoped guard, the only lock
//! - `list`: intrusive doubly-linked lists by arena index
//! - `thread`: thread control blocks
//! - `kernel`: the kernel object owning all of the above
//! - `event`: waitable objects sharing the pend and abort paths
//! - `system`: the system-wide instance
//! - `arch`: platform interrupt controllers
//!
//! # Safety
//!
//! This is a `#![no_std]` kernel outside of tests and the `std` feature. All
//! unsafe code is documented with safety invariants explaining why the usage
//! is correct.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]

extern crate alloc;

mod abort;
pub mod arch;
pub mod config;
pub mod event;
pub mod irq;
pub mod kernel;
pub mod list;
mod sched;
#[cfg(any(test, feature = "std", all(target_arch = "x86_64", target_os = "none")))]
pub mod system;
pub mod thread;

#[cfg(test)]
mod testutil;

pub use config::KernelConfig;
pub use event::{Event, EventType, FlagGroup, Waitable};
#[cfg(any(test, feature = "std"))]
pub use irq::HostInterrupts;
pub use irq::CriticalSection;
pub use kernel::Kernel;
pub use list::{ListError, ListOwner, WaitListId};
pub use thread::{ThreadId, ThreadInfo};

pub use ucwrap_common::{ErrorCode, KernelError, PendAbortOpt, PendOn, PendStatus, QueueOrder};
pub use ucwrap_hal::{InterruptController, IrqState};
