// The `utils` module provides utility functions for the crate.

pub mod template;

pub use crate::utils::template::{TEngine, TEngineError};
