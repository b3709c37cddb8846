// tithe/src/pipeline/mod.rs

//! Step pipelines: declaration, handler registration and execution.

pub mod definition;
pub mod execution;

pub use definition::{Handler, Pipeline};
