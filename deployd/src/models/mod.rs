//! Domain models

pub mod bucket;
pub mod deployment;
pub mod patch;
