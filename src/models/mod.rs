//! Core data models for admin lookups.

pub mod accuracy;
pub mod admin;
pub mod coord;

pub use accuracy::{AccuracyConfig, ResolvedAccuracy, DEFAULT_ACCURACY};
pub use admin::{AdminLevel, AdminLookup, AdminUnit, AmphoeLookup, ProvinceLookup, TambonLookup};
pub use coord::Coordinate;
