pub mod cache;
pub mod db;
pub mod mappings;
pub mod metrics;
pub mod server;
pub mod upstream;
pub mod version;
pub mod web;
