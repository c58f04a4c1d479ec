pub mod battery;
pub mod clock;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod emotion;
pub mod error;
pub mod export;
pub mod filter;
pub mod gaze;
pub mod idle;
pub mod raster;
pub mod runtime;
pub mod scheduler;

pub use battery::*;
pub use clock::*;
pub use config::*;
pub use dispatch::*;
pub use emotion::*;
pub use error::*;
pub use export::*;
pub use filter::*;
pub use gaze::*;
pub use idle::*;
pub use raster::*;
pub use runtime::*;
pub use scheduler::*;
