//! Deployment module

pub mod compose;
pub mod locks;
pub mod merge;
pub mod service;
pub mod store;
