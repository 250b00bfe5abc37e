//! Command-line front-end for the stretto trajectory generator.

pub mod cli;
pub mod config;
