/// Supplies the user key progress is stored under.
pub trait IdentityProvider: Send + Sync {
    fn user_id(&self) -> &str;
}

/// Single-user deployments: every request acts as the same account.
#[derive(Debug, Clone)]
pub struct FixedIdentity(String);

impl FixedIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self(user_id.into())
    }
}

impl IdentityProvider for FixedIdentity {
    fn user_id(&self) -> &str {
        &self.0
    }
}
