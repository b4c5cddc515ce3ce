//! Config buckets: ad-hoc directories of configuration files

pub mod reload;
pub mod scanner;
