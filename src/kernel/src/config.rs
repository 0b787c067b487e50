//! Kernel sizing.

/// Default number of thread control blocks.
pub const DEFAULT_MAX_THREADS: usize = 64;

/// Default number of wait lists.
pub const DEFAULT_MAX_WAIT_LISTS: usize = 128;

/// Capacities fixed when a [`Kernel`](crate::Kernel) is built.
///
/// Both tables are allocated up front, so nothing allocates once the kernel
/// is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelConfig {
    /// Maximum number of threads.
    pub max_threads: usize,
    /// Maximum number of wait lists (one per waitable object).
    pub max_wait_lists: usize,
}

impl KernelConfig {
    /// Configuration with the default capacities.
    pub const fn new() -> Self {
        Self {
            max_threads: DEFAULT_MAX_THREADS,
            max_wait_lists: DEFAULT_MAX_WAIT_LISTS,
        }
    }

    /// Set the thread capacity.
    pub const fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Set the wait list capacity.
    pub const fn with_max_wait_lists(mut self, max_wait_lists: usize) -> Self {
        self.max_wait_lists = max_wait_lists;
        self
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::new()
    }
}
