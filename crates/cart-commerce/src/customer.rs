//! Customer identity and display labeling.

use crate::ids::UserId;
use serde::{Deserialize, Serialize};

/// Anything that can render a user-facing label for itself.
///
/// Concrete identity types implement this with a fixed field precedence,
/// resolved at compile time.
pub trait DisplayName {
    /// User-facing label.
    fn display_name(&self) -> String;
}

/// A customer as known to the cart core.
///
/// All descriptive fields are optional; the display label falls back
/// through username, name, email, then the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    /// Stable user identifier.
    pub id: UserId,
    /// Login handle.
    pub username: Option<String>,
    /// Full name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
}

impl Customer {
    /// Create a customer with only an id.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            username: None,
            name: None,
            email: None,
        }
    }

    /// Set the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the full name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl DisplayName for Customer {
    fn display_name(&self) -> String {
        self.username
            .as_deref()
            .or(self.name.as_deref())
            .or(self.email.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| self.id.to_string())
    }
}
