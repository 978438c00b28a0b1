pub mod affine;
pub mod raster;
pub mod simulate;
pub mod split;

pub use affine::Affine;
pub use raster::RasterBuffer;
pub use simulate::{simulate, SimulationMode, SimulationOutput, SimulationSession};
