//! Architecture-specific implementations.
//!
//! Each architecture provides an [`InterruptController`](ucwrap_hal::InterruptController)
//! for the CPU it runs on. Currently supported: bare-metal x86_64.

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod x86_64;

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub use self::x86_64::Cpu;
