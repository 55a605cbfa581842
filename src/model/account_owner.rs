use serde::{Deserialize, Serialize};

/// Human-readable identity tag attached to a `Wallet`, used for audit logging around
/// withdrawals — not validated against anything, just carried through.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AccountOwner {
    name: Option<String>,
    email: Option<String>,
}

impl AccountOwner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}
