pub mod manager;
pub mod oauth;
pub mod profile;

pub use manager::SessionStore;
pub use oauth::{google_login_url, validate_redirect_uri};
pub use profile::{SessionFile, StoredSession};
