//! Offset/size pagination for the read-side query path.

use serde::{Deserialize, Serialize};

/// Largest page a single query may request.
pub const MAX_PAGE_SIZE: u32 = 1_000;

/// Default number of entries per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A window over an ordered result set: skip `from` entries, return up to `size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub from: u32,
    pub size: u32,
}

impl Page {
    pub fn new(from: u32, size: u32) -> Self {
        Self { from, size }
    }

    /// Translate a 1-based page number into an offset window.
    ///
    /// Page numbers below 1 are treated as the first page.
    pub fn from_page_number(current_page: u32, page_size: u32) -> Self {
        let page = current_page.max(1);
        Self {
            from: (page - 1).saturating_mul(page_size),
            size: page_size,
        }
    }

    /// Check the window bounds, returning a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.size == 0 {
            return Err("size must be greater than 0".to_string());
        }
        if self.size > MAX_PAGE_SIZE {
            return Err(format!("size can not exceed {MAX_PAGE_SIZE}"));
        }
        Ok(())
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            from: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}
