mod asset;
mod config;
mod util;
pub mod map;

pub use asset::*;
pub use config::*;
pub use util::*;
pub use map::*;
