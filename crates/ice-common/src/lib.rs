//! Common types shared by the glacier-dems crates and the DEM builder.

pub mod error;
pub mod glacier;

pub use error::ParseError;
pub use glacier::{DemSource, Glacier};
