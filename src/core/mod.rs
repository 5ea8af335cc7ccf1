//! Shared infrastructure: configuration, errors, process execution, git

pub mod config;
pub mod context;
pub mod error;
pub mod runner;
pub mod vcs;
