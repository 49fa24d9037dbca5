//! Test identity provider.

use quizrun_core::collaborator::IdentityProvider;

/// An identity provider with a fixed answer.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    user_id: Option<String>,
}

impl StaticIdentity {
    /// A signed-in user with the given id.
    #[must_use]
    pub fn signed_in(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_owned()),
        }
    }

    /// No user signed in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }
}

impl IdentityProvider for StaticIdentity {
    fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}
