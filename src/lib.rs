pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
pub mod pipeline;
pub mod queries;
pub mod report;
pub mod server;
pub mod types;
