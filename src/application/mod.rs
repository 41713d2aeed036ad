//! Application layer: the pure filter/aggregation core and the engine shell
//! that feeds it from the configured sources.

pub mod aggregate;
pub mod dashboard;
pub mod filter;
