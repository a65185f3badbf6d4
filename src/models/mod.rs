pub mod enums;
pub mod producer;

pub use enums::*;
pub use producer::*;
