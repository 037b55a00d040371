//! Error types

mod config;
mod field;
mod transport;
mod validation;

pub use config::*;
pub use field::*;
pub use transport::*;
pub use validation::*;
