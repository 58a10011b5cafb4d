//! Campus visit registration: visitors submit applications, administrators audit them
//! exactly once and browse them through a filtered pager.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod visits;
