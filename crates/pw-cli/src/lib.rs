//! Library side of the `powerwatch` binary: configuration, logging setup and
//! the build pipeline.

pub mod config;
pub mod logging;
pub mod pipeline;
