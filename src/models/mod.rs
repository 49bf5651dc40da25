pub mod common;
pub mod gallery;
pub mod geometry;
pub mod ratio;
pub mod request;

pub use common::*;
pub use gallery::*;
pub use geometry::*;
pub use ratio::*;
pub use request::*;
