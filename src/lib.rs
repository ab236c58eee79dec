pub mod building_blocks;
pub mod error;
pub mod exporter;
pub mod loader;
pub mod renderer;

pub use error::Error;
