use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::constants::ROLE_COMMISSIONER;

/// Kind of account behind a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Admin,
    Voter,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub account_id: String,
    pub sub: String,
    pub account_type: AccountType,
    pub roles: Vec<String>,
    /// Election a voter account is bound to (absent for admins)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub election_id: Option<Uuid>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Admin accounts may manage elections they are commissioners of
    pub fn is_admin(&self) -> bool {
        self.account_type == AccountType::Admin || self.has_role(ROLE_COMMISSIONER)
    }

    pub fn is_voter(&self) -> bool {
        self.account_type == AccountType::Voter
    }
}

/// Claims the identity provider places under the configured namespace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomClaims {
    pub account_type: AccountType,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub election: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(account_type: AccountType, roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            account_id: "acc".to_string(),
            sub: "sub".to_string(),
            account_type,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            election_id: None,
        }
    }

    #[test]
    fn test_admin_account_is_admin() {
        assert!(user(AccountType::Admin, &[]).is_admin());
        assert!(!user(AccountType::Admin, &[]).is_voter());
    }

    #[test]
    fn test_voter_is_not_admin_without_role() {
        assert!(!user(AccountType::Voter, &[]).is_admin());
        assert!(user(AccountType::Voter, &[ROLE_COMMISSIONER]).is_admin());
    }

    #[test]
    fn test_custom_claims_deserialize() {
        let claims: CustomClaims = serde_json::from_value(serde_json::json!({
            "account_type": "voter",
            "election": "6f1c1f9e-2f0b-4c3e-9a57-0d7c1c2f4b11"
        }))
        .unwrap();
        assert_eq!(claims.account_type, AccountType::Voter);
        assert!(claims.roles.is_empty());
        assert!(claims.election.is_some());
    }
}
