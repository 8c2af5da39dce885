pub mod config;
pub mod logging;

// Resolution layer
pub mod cache;
pub mod checksum;
pub mod descriptor;
pub mod error;
pub mod fetcher;
pub mod overrides;
pub mod resolver;
