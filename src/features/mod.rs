//! Rolling per-entity feature aggregation

pub mod snapshot;
pub mod store;

pub use snapshot::FeatureSnapshot;
pub use store::WindowStore;
