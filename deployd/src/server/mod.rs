//! Local HTTP API

pub mod auth;
pub mod buckets;
pub mod deployments;
pub mod docker;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod serve;
pub mod state;
