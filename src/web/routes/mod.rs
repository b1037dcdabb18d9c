pub mod account_routes;
pub mod cache_routes;
pub mod monitor_routes;
pub mod psp_routes;
pub mod status_routes;
