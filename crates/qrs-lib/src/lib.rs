pub mod classify;
pub mod denoise;
pub mod detectors;
pub mod io;
pub mod segment;
pub mod signal;

pub use classify::*;
pub use denoise::*;
pub use detectors::*;
pub use segment::*;
pub use signal::*;
