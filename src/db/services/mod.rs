//! Database service layer. Each sub-module owns the SQL for one concern so
//! handlers never see queries directly.

pub mod mirror_service;

pub use mirror_service::*;
