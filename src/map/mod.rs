pub mod geometry;
pub mod projection;
pub mod renderer;
pub mod spatial;

pub use projection::Viewport;
pub use renderer::{MapLayers, RegionLayer, RegionShape};
