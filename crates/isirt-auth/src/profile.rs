use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Cookie header captured after a successful login against one backend.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StoredSession {
    /// `name=value` pairs joined with `; `, as the cookie jar reports them.
    pub cookie: String,
    #[serde(default)]
    pub username: Option<String>,
    pub saved_at: i64,
}

impl StoredSession {
    pub fn cookie_pairs(&self) -> impl Iterator<Item = &str> {
        self.cookie
            .split(';')
            .map(str::trim)
            .filter(|pair| pair.contains('='))
    }
}

/// On-disk layout: sessions keyed by backend origin.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionFile {
    pub active_origin: Option<String>,
    pub sessions: HashMap<String, StoredSession>,
}
