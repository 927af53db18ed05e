pub mod auth;
pub mod config;
pub mod domain;
pub mod seed;
pub mod server;
pub mod setup;
pub mod store;
pub mod telemetry;
