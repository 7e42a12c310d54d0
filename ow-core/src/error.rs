//! Error types, shared with every other Onewire Logger crate

pub use ow_error::{OnewireError, Result};
