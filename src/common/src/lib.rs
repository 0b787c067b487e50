//! Types shared between the ucwrap kernel and its object layers.
//!
//! Nothing in here depends on the interrupt model or on allocation, so the
//! same definitions can be used by ports, tests and host-side tooling.

#![no_std]
#![warn(missing_docs)]

pub mod error;
pub mod pend;

pub use error::{ErrorCode, KernelError};
pub use pend::{PendAbortOpt, PendOn, PendStatus, QueueOrder};
