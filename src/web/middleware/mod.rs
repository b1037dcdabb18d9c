pub mod rate_limit;
pub mod track;
