// vaxwatch library crate
// Exposes modules for integration testing

pub mod alerts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod output;
pub mod store;
pub mod utils;
pub mod watch;
