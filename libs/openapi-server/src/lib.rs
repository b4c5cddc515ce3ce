//! Wire models for the serverctl-deployd HTTP API

pub mod models;
