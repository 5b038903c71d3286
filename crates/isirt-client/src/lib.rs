pub mod api;
pub mod backoff;
pub mod error;
pub mod http;
pub mod poller;
pub mod redirect;

use std::sync::Arc;
use std::time::Duration;

pub use backoff::RetryPolicy;
pub use error::{ApiError, ErrorKind};
pub use http::{ApiRequest, CallOptions, ClientOptions, FilePart, HttpClient, RequestBody};
pub use poller::{PollConfig, PollError, TaskPoller, TaskSource};
pub use redirect::AuthRedirect;

/// Incident creation with evidence and ISIRT analysis run long on the server.
pub const LONG_RUNNING_TIMEOUT: Duration = Duration::from_secs(120);
pub const SUMMARY_TIMEOUT: Duration = Duration::from_secs(60);

/// Typed facade over the ISIRT REST API. Cheap to clone; clones share the
/// cookie jar.
#[derive(Debug, Clone)]
pub struct IsirtClient {
    http: HttpClient,
}

impl IsirtClient {
    pub fn new(options: ClientOptions) -> Result<Self, ApiError> {
        Ok(Self {
            http: HttpClient::new(options)?,
        })
    }

    pub fn with_redirect(self, handler: Arc<dyn AuthRedirect>) -> Self {
        Self {
            http: self.http.with_redirect(handler),
        }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn origin(&self) -> String {
        self.http.origin()
    }

    pub fn session_cookie(&self) -> Option<String> {
        self.http.session_cookie()
    }

    pub fn restore_session_cookie<'a>(&self, pairs: impl IntoIterator<Item = &'a str>) {
        self.http.restore_session_cookie(pairs)
    }
}
