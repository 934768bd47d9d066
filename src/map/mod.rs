pub mod parse;
mod error;
mod tile;
mod tileset;
mod verify;
mod write;

pub use error::*;
pub use tile::*;
pub use tileset::*;
pub use verify::*;
pub use write::*;
