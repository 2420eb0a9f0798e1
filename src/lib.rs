pub mod backend_client;
pub mod cli;
pub mod config;
