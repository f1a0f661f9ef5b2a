pub use crate::errors::{GoldenError, Result};

pub mod catalog;
pub mod cli;
pub mod compare;
pub mod compiler;
pub mod config;
pub mod document;
pub mod errors;
pub mod golden;
pub mod harness;
pub mod normalize;
pub mod scenario;
