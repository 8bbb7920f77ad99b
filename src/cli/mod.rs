//! Command-line interface module.
//!
//! Server configuration is taken from the command line only; see [`Args`].

mod args;

pub use args::{parse_size, Args};
