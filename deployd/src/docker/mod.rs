//! Container runtime proxy

pub mod proxy;
pub mod runtime;
