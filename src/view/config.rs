//! Paged reader configuration

/// Default number of rows fetched per page
pub const DEFAULT_WINDOW_SIZE: usize = 512;

/// Smallest window an out-of-memory failure can still shrink from
pub const MIN_SHRINKABLE_WINDOW: usize = 4;

/// Configuration handed to each paged reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Initial (and, for stored views, fixed) page size. Never zero.
    pub window_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl ReaderConfig {
    /// Config with the given page size; zero is raised to one
    pub fn with_window_size(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
        }
    }
}
