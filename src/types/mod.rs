pub mod bar;
pub mod prediction;

pub use bar::*;
pub use prediction::*;
