//! Effective-branch resolution.
//!
//! A superadmin may act on any branch named in the request; everyone else is
//! pinned to the branch in their token. Services receive the resolved
//! [`BranchScope`] and never look at raw role strings.

use mashar_auth::{Claims, Role};
use mashar_core::AppError;

use crate::utils::messages;

/// Role and home branch of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeContext {
    pub username: String,
    pub role: Role,
    pub branch: String,
}

/// Which branches a query may touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchScope {
    All,
    Branch(String),
}

impl BranchScope {
    /// The single branch, or `None` for an unrestricted scope.
    pub fn branch(&self) -> Option<&str> {
        match self {
            BranchScope::All => None,
            BranchScope::Branch(code) => Some(code),
        }
    }

    /// Appends `AND <column> = $n` to `where_clause` and the bound value to
    /// `params` when the scope is restricted.
    pub fn push_filter(&self, column: &str, where_clause: &mut String, params: &mut Vec<String>) {
        if let BranchScope::Branch(code) = self {
            params.push(code.clone());
            where_clause.push_str(&format!(" AND {column} = ${}", params.len()));
        }
    }
}

impl From<&Claims> for ScopeContext {
    fn from(claims: &Claims) -> Self {
        Self {
            username: claims.username().to_string(),
            role: claims.role,
            branch: claims.branch.clone(),
        }
    }
}

impl ScopeContext {
    pub fn is_superadmin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    pub fn is_admin(&self) -> bool {
        self.role.satisfies(Role::Admin)
    }

    /// Branch to write to. `requested` is honoured only for superadmins;
    /// a superadmin without a request falls back to their own branch.
    pub fn effective_branch(&self, requested: Option<&str>) -> String {
        match requested.map(str::trim).filter(|b| !b.is_empty()) {
            Some(branch) if self.is_superadmin() => branch.to_string(),
            _ => self.branch.clone(),
        }
    }

    /// Scope for list queries: a superadmin without a requested branch sees all.
    pub fn list_scope(&self, requested: Option<&str>) -> BranchScope {
        let requested = requested.map(str::trim).filter(|b| !b.is_empty());
        match requested {
            None if self.is_superadmin() => BranchScope::All,
            _ => BranchScope::Branch(self.effective_branch(requested)),
        }
    }

    /// Rejects access to a branch named explicitly in the path.
    pub fn authorize_branch(&self, branch: &str) -> Result<(), AppError> {
        if self.is_superadmin() || self.branch == branch {
            Ok(())
        } else {
            Err(AppError::forbidden(messages::FORBIDDEN_BRANCH))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: Role) -> ScopeContext {
        ScopeContext {
            username: "dana@mashar.org".to_string(),
            role,
            branch: "ksv".to_string(),
        }
    }

    #[test]
    fn test_superadmin_targets_requested_branch() {
        assert_eq!(ctx(Role::SuperAdmin).effective_branch(Some("tlv")), "tlv");
        assert_eq!(ctx(Role::SuperAdmin).effective_branch(None), "ksv");
        assert_eq!(ctx(Role::SuperAdmin).effective_branch(Some("  ")), "ksv");
    }

    #[test]
    fn test_admin_is_pinned() {
        assert_eq!(ctx(Role::Admin).effective_branch(Some("tlv")), "ksv");
        assert_eq!(ctx(Role::Teacher).effective_branch(None), "ksv");
    }

    #[test]
    fn test_list_scope() {
        assert_eq!(ctx(Role::SuperAdmin).list_scope(None), BranchScope::All);
        assert_eq!(
            ctx(Role::SuperAdmin).list_scope(Some("tlv")),
            BranchScope::Branch("tlv".to_string())
        );
        assert_eq!(
            ctx(Role::Admin).list_scope(None),
            BranchScope::Branch("ksv".to_string())
        );
        assert_eq!(
            ctx(Role::Teacher).list_scope(Some("tlv")),
            BranchScope::Branch("ksv".to_string())
        );
    }

    #[test]
    fn test_authorize_branch() {
        assert!(ctx(Role::Admin).authorize_branch("ksv").is_ok());
        assert_eq!(
            ctx(Role::Admin).authorize_branch("tlv").unwrap_err().status_code(),
            403
        );
        assert!(ctx(Role::SuperAdmin).authorize_branch("tlv").is_ok());
    }

    #[test]
    fn test_push_filter() {
        let mut where_clause = String::new();
        let mut params = vec!["x".to_string()];
        BranchScope::Branch("ksv".to_string()).push_filter("g.branch", &mut where_clause, &mut params);
        assert_eq!(where_clause, " AND g.branch = $2");
        assert_eq!(params, vec!["x", "ksv"]);

        let mut where_clause = String::new();
        BranchScope::All.push_filter("g.branch", &mut where_clause, &mut params);
        assert!(where_clause.is_empty());
    }
}
