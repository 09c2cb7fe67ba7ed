//! Thaigeo - resolve a coordinate to its Thai province, amphoe and tambon
//!
//! Lookups stream polygon datasets from disk and cascade from the broadest
//! level down, reading each child dataset only when its parent matched.

pub mod config;
pub mod error;
pub mod models;
pub mod pip;

pub use error::LookupError;
pub use models::{
    AccuracyConfig, AdminLevel, AdminLookup, AdminUnit, AmphoeLookup, Coordinate, ProvinceLookup,
    TambonLookup,
};
pub use pip::{AdminResolver, DatasetRepository, FsRepository, MemoryRepository};
