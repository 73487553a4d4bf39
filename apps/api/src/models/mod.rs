mod map;
mod position;
mod restaurant;

pub use map::*;
pub use position::*;
pub use restaurant::*;
