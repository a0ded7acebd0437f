//! Owner-or-admin authorization for mutating car listings.

use crate::models::{ActingUser, Role, UserId};

/// What an acting user is entitled to mutate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// May mutate any resource.
    Admin,
    /// May mutate only resources owned by this id.
    Owner(UserId),
}

impl Capability {
    pub fn permits(&self, owner_id: UserId) -> bool {
        match self {
            Capability::Admin => true,
            Capability::Owner(id) => *id == owner_id,
        }
    }
}

impl ActingUser {
    pub fn capability(&self) -> Capability {
        match self.role {
            Role::Admin => Capability::Admin,
            Role::User => Capability::Owner(self.id),
        }
    }
}

/// Whether `actor` may update or delete a resource owned by `owner_id`.
pub fn may_mutate(actor: &ActingUser, owner_id: UserId) -> bool {
    actor.capability().permits(owner_id)
}
