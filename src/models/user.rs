//! User model for the session and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Role assigned to a user by the server. The client only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub enum Role {
    /// Regular customer
    #[serde(rename = "kunde", alias = "customer")]
    Customer,
    /// Customer who is also an approved coach
    #[serde(rename = "kunde_og_coach", alias = "customer_and_coach")]
    CustomerAndCoach,
    /// Administrator
    #[serde(rename = "admin")]
    Admin,
    /// A role string this client does not know about
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Parse a role string as sent by the API (English aliases accepted).
    pub fn parse(raw: &str) -> Option<Role> {
        match raw.trim() {
            "kunde" | "customer" => Some(Role::Customer),
            "kunde_og_coach" | "customer_and_coach" => Some(Role::CustomerAndCoach),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Wire value sent to the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "kunde",
            Role::CustomerAndCoach => "kunde_og_coach",
            Role::Admin => "admin",
            Role::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct User {
    /// Server-side user ID (UUID string)
    pub id: String,
    /// Login email (normalized lowercase)
    pub email: String,
    /// Display name (the server falls back to the email)
    #[serde(rename = "navn")]
    pub display_name: String,
    /// Assigned role
    #[serde(rename = "rolle")]
    pub role: Role,
}

/// `GET /api/me` response: the user plus coach-application status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: User,
    /// Whether the user has applied to become a coach
    #[serde(rename = "coach_sokt", default)]
    pub coach_requested: bool,
    /// Whether an admin approved the application
    #[serde(rename = "coach_godkjent", default)]
    pub coach_approved: bool,
    /// Whether the user may switch between dashboard views
    #[serde(rename = "kan_bytte_view", default)]
    pub can_switch_view: bool,
}

/// Login/signup response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_wire_format() {
        let json = r#"{"id":"u1","email":"a@b.no","rolle":"kunde_og_coach","navn":"Ola"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::CustomerAndCoach);
        assert_eq!(user.display_name, "Ola");

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["rolle"], "kunde_og_coach");
    }

    #[test]
    fn test_unknown_role_does_not_fail() {
        let json = r#"{"id":"u1","email":"a@b.no","rolle":"superhero","navn":"Ola"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Unknown);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("customer"), Some(Role::Customer));
        assert_eq!(Role::parse("kunde"), Some(Role::Customer));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn test_profile_flattens_user() {
        let json = r#"{"id":"u1","email":"a@b.no","rolle":"admin","navn":"A",
            "coach_sokt":false,"coach_godkjent":false,"kan_bytte_view":true}"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.user.role, Role::Admin);
        assert!(profile.can_switch_view);
    }
}
