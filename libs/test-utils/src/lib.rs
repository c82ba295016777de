//! Shared test support: an in-memory event catalog, reference-data
//! fixtures and a fixed clock.

pub mod clock;
pub mod fixtures;
pub mod store;

pub use clock::{FixedClock, local_time};
pub use fixtures::*;
pub use store::InMemoryStore;

/// Route `tracing` output to the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}
