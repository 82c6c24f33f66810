//! Backend abstraction layer
//!
//! Provides the common traits and types a graphics backend implements, plus
//! the headless CPU backend used for tests and GPU-less development.

pub mod headless;
pub mod traits;
pub mod types;

pub use traits::*;
pub use types::*;
