pub mod document;
pub mod extracted;

pub use document::*;
pub use extracted::*;
