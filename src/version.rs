/// Version string reported by the health endpoint. Release pipelines can
/// override the Cargo version by setting `APP_VERSION` at build time.
pub const VERSION: &str = match option_env!("APP_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};
