//! Roles and JWT claims.
//!
//! Mashar has three roles. A superadmin works across every branch; admins
//! and teachers are pinned to the branch stored in their token.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    SuperAdmin,
    Admin,
    Teacher,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::SuperAdmin, Role::Admin, Role::Teacher];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "superadmin",
            Role::Admin => "admin",
            Role::Teacher => "teacher",
        }
    }

    /// True when a holder of `self` may act where `required` is demanded.
    ///
    /// Superadmin satisfies every requirement; otherwise the roles must match.
    pub fn satisfies(&self, required: Role) -> bool {
        *self == Role::SuperAdmin || *self == required
    }

    /// True when `self` satisfies at least one of `allowed`.
    pub fn satisfies_any(&self, allowed: &[Role]) -> bool {
        allowed.iter().any(|r| self.satisfies(*r))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "superadmin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Lets `sqlx::FromRow` decode the `users.role` text column.
impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Username (always an email address, lowercased)
    pub sub: String,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    pub role: Role,
    /// Branch code the user belongs to
    pub branch: String,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    pub fn username(&self) -> &str {
        &self.sub
    }

    pub fn is_superadmin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("student".parse::<Role>().is_err());
    }

    #[test]
    fn test_superadmin_satisfies_everything() {
        for role in Role::ALL {
            assert!(Role::SuperAdmin.satisfies(role));
        }
    }

    #[test]
    fn test_other_roles_only_satisfy_themselves() {
        assert!(Role::Admin.satisfies(Role::Admin));
        assert!(!Role::Admin.satisfies(Role::SuperAdmin));
        assert!(!Role::Admin.satisfies(Role::Teacher));
        assert!(!Role::Teacher.satisfies(Role::Admin));
        assert!(Role::Teacher.satisfies_any(&[Role::Admin, Role::Teacher]));
        assert!(!Role::Teacher.satisfies_any(&[Role::Admin]));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            r#""superadmin""#
        );
    }

    #[test]
    fn test_claims_deserialize() {
        let json = r#"{"sub":"t@school.org","name":"T","email":"t@school.org","role":"teacher","branch":"tlv","exp":9999999999,"iat":9999999900}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.username(), "t@school.org");
        assert_eq!(claims.role, Role::Teacher);
        assert_eq!(claims.branch, "tlv");
        assert!(!claims.is_superadmin());
    }
}
