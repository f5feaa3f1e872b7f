use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Hr,
    Applicant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Hr => "hr",
            Role::Applicant => "applicant",
        }
    }

    /// Roles allowed on the HR back office.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "hr" => Ok(Role::Hr),
            "applicant" => Ok(Role::Applicant),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    /// `None` for accounts imported from LinkedIn; those cannot log in.
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub address: Option<String>,
    pub deletion_requested_at: Option<DateTime<Utc>>,
    pub deletion_due_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: &str, role: Role, password_hash: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            role,
            password_hash,
            name: None,
            birthdate: None,
            address: None,
            deletion_requested_at: None,
            deletion_due_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
            name: self.name.clone(),
            birthdate: self.birthdate,
            address: self.address.clone(),
            deletion_due_at: self.deletion_due_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// User as exposed over the API; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_due_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_birthdate(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.date_naive())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [Role::Admin, Role::Hr, Role::Applicant] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("recruiter".parse::<Role>().is_err());
    }

    #[test]
    fn test_new_user_lowercases_email() {
        let user = User::new("  Jane.Doe@Example.COM ", Role::Applicant, None);
        assert_eq!(user.email, "jane.doe@example.com");
    }

    #[test]
    fn test_parse_birthdate_formats() {
        let expected = NaiveDate::from_ymd_opt(1990, 4, 12);
        assert_eq!(parse_birthdate("1990-04-12"), expected);
        assert_eq!(parse_birthdate("1990-04-12T00:00:00Z"), expected);
        assert_eq!(parse_birthdate("12.04.1990"), None);
    }

    #[test]
    fn test_view_hides_nothing_sensitive() {
        let user = User::new("a@b.c", Role::Hr, Some("hash".to_string()));
        let json = serde_json::to_value(user.view()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "hr");
    }
}
