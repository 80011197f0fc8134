pub mod activity;
pub mod aggregate;
pub mod analytics;
pub mod dates;
pub mod error;
pub mod file_config;
pub mod hierarchy;
pub mod import;
pub mod logging;
pub mod store;
pub mod tasks;
