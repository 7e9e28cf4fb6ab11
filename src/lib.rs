//! readygate: block a container's startup until its dependencies accept TCP
//! connections, then hand the process over to the real command.

pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod handoff;
pub mod target;

pub use error::{ConfigError, Error, Result};
