use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque local identity used to tell "locked by me" from "locked by other".
/// The sync engine never authenticates; the identity collaborator fills in
/// email/name/role when it has them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "user".to_string()
}

impl UserIdentity {
    /// Locally generated identity, stable for the lifetime of the process.
    pub fn local() -> Self {
        Self {
            id: format!("user_{}", Uuid::new_v4().simple()),
            email: None,
            name: None,
            role: default_role(),
        }
    }

    pub fn authenticated(
        id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: Some(email.into()),
            name: Some(name.into()),
            role: role.into(),
        }
    }
}
