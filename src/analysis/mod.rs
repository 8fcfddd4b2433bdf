//! Analytics over product snapshots.

pub mod aggregator;

pub use aggregator::*;
