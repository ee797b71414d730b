//! Core VCE reader module

pub mod codec;
pub mod format;
pub mod formatting;
pub mod reader;
pub mod types;
pub mod utils;

pub use reader::VceReader;
pub use types::error::{ErrorKind, Result, VceError};
pub use types::models;
