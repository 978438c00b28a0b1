pub mod abnormality;
pub mod classify;
pub mod config;
pub mod coronal;
pub mod curvature;
pub mod draw;
pub mod error;
pub mod generic;
pub mod geom;
pub mod implants;
pub mod measurement;
pub mod polygon;
pub mod sagittal;
pub mod session;
pub mod spinopelvic;
pub mod tools;
pub mod vbm;

pub use config::SpineConfig;
pub use draw::DrawList;
pub use error::{Result, SpineError};
pub use geom::Point;
pub use measurement::Measurement;
pub use session::{MeasureSession, ToolSession, ToolShape};
