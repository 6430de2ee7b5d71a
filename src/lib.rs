pub mod cli;
pub mod error;
pub mod model;
pub mod protocol;
pub mod services;

pub use error::{Error, Result};
