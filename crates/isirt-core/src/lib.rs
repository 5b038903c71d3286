pub mod config;
pub mod navigation;
pub mod session;

pub use config::{load_config, ConfigError, IsirtConfig, PollSettings};
pub use navigation::RouteTracker;
pub use session::{RouteGuard, SessionHolder, SessionState};
