//! Point-in-Polygon (PIP) admin lookup service.
//!
//! Streams admin boundaries out of on-disk GeoJSON datasets and resolves
//! a point level by level: province, amphoe, tambon. Each level's match
//! selects the dataset for the next.

mod boundary;
mod dataset;
mod scanner;
mod service;
mod stream;

#[cfg(test)]
pub(crate) mod fixtures;

pub use boundary::AdminBoundary;
pub use dataset::{DatasetKey, DatasetRepository, FsRepository, MemoryRepository};
pub use scanner::scan;
pub use service::AdminResolver;
pub use stream::FeatureStream;
