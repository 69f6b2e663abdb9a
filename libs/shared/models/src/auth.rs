use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub hospital_id: Option<i64>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

/// Authenticated actor as decoded from the identity provider's token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub hospital_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Authorization context handed explicitly to services that need scope
/// checks. Built from the validated token claims, never read from ambient
/// state.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub actor_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub hospital_id: Option<i64>,
}

impl AuthContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            actor_id: user.id.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            hospital_id: user.hospital_id,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }

    pub fn is_sub_admin(&self) -> bool {
        self.role.as_deref() == Some("sub-admin")
    }

    pub fn is_doctor(&self) -> bool {
        self.role.as_deref() == Some("doctor")
    }

    /// Hospital-scoped actors may only touch rows of their own hospital;
    /// full admins bypass the scope check.
    pub fn can_act_for_hospital(&self, hospital_id: i64) -> bool {
        self.is_admin() || self.hospital_id == Some(hospital_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str, hospital_id: Option<i64>) -> User {
        User {
            id: "actor-1".to_string(),
            email: Some("actor@example.com".to_string()),
            role: Some(role.to_string()),
            hospital_id,
            created_at: None,
        }
    }

    #[test]
    fn sub_admin_is_scoped_to_own_hospital() {
        let ctx = AuthContext::from_user(&user("sub-admin", Some(3)));
        assert!(ctx.is_sub_admin());
        assert!(ctx.can_act_for_hospital(3));
        assert!(!ctx.can_act_for_hospital(4));
    }

    #[test]
    fn admin_bypasses_hospital_scope() {
        let ctx = AuthContext::from_user(&user("admin", None));
        assert!(ctx.can_act_for_hospital(9));
    }

    #[test]
    fn missing_scope_claim_denies_everything() {
        let ctx = AuthContext::from_user(&user("sub-admin", None));
        assert!(!ctx.can_act_for_hospital(1));
    }
}
