pub mod clock;
pub mod endpoint;
pub mod query;
pub mod readers;

pub use clock::{Clock, SystemClock};
pub use endpoint::{Endpoint, EndpointPlan};
pub use query::{EventOrder, EventQuery};
pub use readers::{CatalogReader, EventReader};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAP_PAGE_SIZE: u64 = 100;
pub const BUCKET_PAGE_SIZE: u64 = 3;
pub const CATEGORY_PAGE_SIZE: u64 = 5;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Events shown in one bucket of a tab.
pub const BUCKET_EVENT_LIMIT: u64 = 10;

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn new(page: Option<u64>, page_size: Option<u64>, default_size: u64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(default_size).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 { (self.page - 1) * self.page_size }
}
