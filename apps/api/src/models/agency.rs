use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of random bytes behind an API key (hex-encoded to 48 chars).
const API_KEY_BYTES: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "jobs:read")]
    JobsRead,
    #[serde(rename = "applications:read")]
    ApplicationsRead,
}

impl Permission {
    pub const DEFAULT: [Permission; 2] = [Permission::JobsRead, Permission::ApplicationsRead];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::JobsRead => "jobs:read",
            Permission::ApplicationsRead => "applications:read",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jobs:read" => Ok(Permission::JobsRead),
            "applications:read" => Ok(Permission::ApplicationsRead),
            other => Err(format!("unknown permission '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Agency {
    pub id: Uuid,
    pub name: String,
    pub api_key: String,
    pub active: bool,
    pub permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agency {
    pub fn new(name: String, permissions: Vec<Permission>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            api_key: generate_api_key(),
            active: true,
            permissions,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn allows(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn rotate_key(&mut self) -> &str {
        self.api_key = generate_api_key();
        self.updated_at = Utc::now();
        &self.api_key
    }

    pub fn view(&self) -> AgencyView {
        AgencyView {
            id: self.id,
            name: self.name.clone(),
            active: self.active,
            permissions: self.permissions.clone(),
            created_at: self.created_at,
        }
    }
}

/// Listing shape for admins; the key itself is only returned at creation or
/// rotation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyView {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
    pub permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
}

pub fn generate_api_key() -> String {
    let mut bytes = [0u8; API_KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
