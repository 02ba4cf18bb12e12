//! Data models

pub mod decision;
pub mod outcome;

pub use decision::*;
pub use outcome::*;
