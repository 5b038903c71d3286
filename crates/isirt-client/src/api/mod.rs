//! One method per backend operation, grouped by resource. Each method fixes
//! the HTTP method, path and call options; errors pass through unchanged.

pub mod audit;
pub mod auth;
pub mod classification;
pub mod groups;
pub mod incidents;
pub mod intake;
pub mod settings;
pub mod users;
