//! Pure domain types with minimal dependencies
//!
//! Types here carry no rendering or I/O concerns so every other module can
//! depend on them.

pub mod catalog;
pub mod geometry;
pub mod hand;

pub use catalog::*;
pub use geometry::*;
pub use hand::*;
