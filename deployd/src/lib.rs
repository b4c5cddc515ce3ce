//! serverctl-deployd library
//!
//! Core modules of the local deployment control-plane service.

pub mod app;
pub mod buckets;
pub mod deploy;
pub mod docker;
pub mod errors;
pub mod filesys;
pub mod logs;
pub mod models;
pub mod server;
pub mod storage;
pub mod utils;
