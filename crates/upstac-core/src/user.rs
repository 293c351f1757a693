use crate::types::Role;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub roles: BTreeSet<Role>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_token: String,
}

impl User {
    pub fn new(id: u64, username: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            id,
            username: username.into(),
            roles: roles.into_iter().collect(),
            api_token: String::new(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = token.into();
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|r| self.has_role(*r))
    }

    pub fn actor_ref(&self) -> ActorRef {
        ActorRef {
            id: self.id,
            username: self.username.clone(),
        }
    }

    /// Same identity as the referenced actor.
    pub fn is(&self, actor: &ActorRef) -> bool {
        self.id == actor.id
    }
}

// ---------------------------------------------------------------------------
// ActorRef
// ---------------------------------------------------------------------------

/// Weak reference to a user, stored on test requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorRef {
    pub id: u64,
    pub username: String,
}

// ---------------------------------------------------------------------------
// UserDirectory
// ---------------------------------------------------------------------------

/// Resolves callers to users. The core never looks up the current user itself.
pub trait UserDirectory {
    fn find_by_token(&self, token: &str) -> Option<User>;
    fn find_by_username(&self, username: &str) -> Option<User>;
}

/// Random 32-character alphanumeric API token.
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}
