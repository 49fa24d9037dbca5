//! Bearer-token identity.

use quizrun_core::collaborator::IdentityProvider;

/// The current user as known from an access token. Signed in exactly when a
/// token is present.
#[derive(Debug, Clone, Default)]
pub struct TokenIdentity {
    token: Option<String>,
    user_id: Option<String>,
}

impl TokenIdentity {
    /// An identity holding `token` for `user_id`. Blank tokens count as no
    /// token.
    #[must_use]
    pub fn new(token: Option<String>, user_id: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
            user_id,
        }
    }

    /// Nobody signed in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The access token, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl IdentityProvider for TokenIdentity {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn current_user_id(&self) -> Option<String> {
        if self.is_authenticated() {
            self.user_id.clone()
        } else {
            None
        }
    }
}
