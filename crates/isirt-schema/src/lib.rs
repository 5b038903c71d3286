pub mod audit;
pub mod classification;
pub mod incident;
pub mod settings;
pub mod task;
pub mod timestamp;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use audit::*;
pub use classification::*;
pub use incident::*;
pub use settings::*;
pub use task::*;

/// Role names exactly as the backend spells them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    #[serde(rename = "Empleado")]
    Employee,
    #[serde(rename = "Miembro IRT")]
    IrtMember,
    #[serde(rename = "Líder IRT")]
    IrtLead,
    #[serde(rename = "Administrador")]
    Administrator,
    #[serde(rename = "Super Admin")]
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "Empleado",
            Self::IrtMember => "Miembro IRT",
            Self::IrtLead => "Líder IRT",
            Self::Administrator => "Administrador",
            Self::SuperAdmin => "Super Admin",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        [
            Self::Employee,
            Self::IrtMember,
            Self::IrtLead,
            Self::Administrator,
            Self::SuperAdmin,
        ]
        .into_iter()
        .find(|role| role.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

/// The signed-in user as the session layer sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    /// The account e-mail, which doubles as the login name.
    pub username: String,
    pub role: String,
    pub is_active: bool,
}

impl From<&UserProfile> for User {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.user_id,
            username: profile.email.clone(),
            role: profile.role.clone(),
            is_active: profile.is_active,
        }
    }
}

impl From<UserProfile> for User {
    fn from(profile: UserProfile) -> Self {
        Self::from(&profile)
    }
}

/// Full user record returned by `/me/` and `/users/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    pub role: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub group: Option<Group>,
    #[serde(default, with = "crate::timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::timestamp::option")]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deactivation_reason: Option<String>,
    #[serde(default)]
    pub auto_deactivated: Option<bool>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserCreate {
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    /// Optional because OAuth-only accounts have no password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// Filters accepted by `GET /users/export`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserExportFilters {
    pub status: Option<AccountStatus>,
    pub role: Option<String>,
}

impl UserExportFilters {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(status) = self.status {
            query.push(("status".to_string(), status.as_str().to_string()));
        }
        if let Some(role) = self.role.as_deref().filter(|r| !r.is_empty()) {
            query.push(("role".to_string(), role.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GroupCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GroupUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_user_maps_profile_fields() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "user_id": 1,
            "email": "a@b.com",
            "role": "Administrador",
            "is_active": true
        }))
        .unwrap();

        let user = User::from(&profile);
        assert_eq!(
            user,
            User {
                id: 1,
                username: "a@b.com".into(),
                role: "Administrador".into(),
                is_active: true,
            }
        );
    }

    #[test]
    fn user_role_uses_backend_spelling() {
        let value = serde_json::to_value(UserRole::IrtLead).unwrap();
        assert_eq!(value, "Líder IRT");
        assert_eq!(UserRole::parse("administrador"), Some(UserRole::Administrator));
        assert_eq!(UserRole::parse("nobody"), None);
    }

    #[test]
    fn export_filters_skip_empty_values() {
        let filters = UserExportFilters {
            status: Some(AccountStatus::Active),
            role: Some(String::new()),
        };
        assert_eq!(
            filters.to_query(),
            vec![("status".to_string(), "active".to_string())]
        );
        assert!(UserExportFilters::default().to_query().is_empty());
    }

    #[test]
    fn user_update_omits_unset_fields() {
        let update = UserUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        let value = serde_json::to_value(update).unwrap();
        assert_eq!(value, serde_json::json!({"is_active": false}));
    }
}
