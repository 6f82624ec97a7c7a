//! Catalogue acquisition.

pub mod loader;

pub use loader::{load_input, InputSource, LoadOptions};
