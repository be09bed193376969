use serde::{Deserialize, Serialize};

/// Row id of a user in the `users` table
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// A stored user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Who is calling a backend operation
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Identity {
    Authenticated(UserId),
    Anonymous,
}

impl Identity {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Identity::Authenticated(id) => Some(*id),
            Identity::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated(_))
    }
}

/// Resolves the identity of the current caller.
///
/// Credential handling lives outside this crate; implementations only answer
/// "who is this, if anyone".
pub trait AuthProvider {
    fn current_identity(&self) -> Identity;
}

/// Provider with an identity fixed at startup
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StaticAuth(pub Identity);

impl StaticAuth {
    pub fn anonymous() -> Self {
        Self(Identity::Anonymous)
    }

    pub fn signed_in(user: UserId) -> Self {
        Self(Identity::Authenticated(user))
    }
}

impl AuthProvider for StaticAuth {
    fn current_identity(&self) -> Identity {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_has_no_user_id() {
        let auth = StaticAuth::anonymous();

        assert_eq!(auth.current_identity(), Identity::Anonymous);
        assert_eq!(auth.current_identity().user_id(), None);
        assert!(!auth.current_identity().is_authenticated());
    }

    #[test]
    fn signed_in_exposes_user_id() {
        let auth = StaticAuth::signed_in(UserId(7));

        assert!(auth.current_identity().is_authenticated());
        assert_eq!(auth.current_identity().user_id(), Some(UserId(7)));
    }
}
