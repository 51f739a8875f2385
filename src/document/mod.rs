//! The Arazzo document model and its YAML export.

pub mod export;
pub mod model;

pub use export::{from_yaml, to_yaml};
pub use model::*;
