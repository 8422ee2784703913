//! Session-scoped actor context

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{ActorProfile, ActorRole};

/// The user acting in the current session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: ActorRole,
    pub profile: ActorProfile,
}

impl Actor {
    pub fn new(id: Uuid, role: ActorRole, profile: ActorProfile) -> Self {
        Self { id, role, profile }
    }

    /// Owner with an empty profile
    pub fn owner(id: Uuid) -> Self {
        Self::new(id, ActorRole::Owner, ActorProfile::default())
    }

    pub fn admin(id: Uuid) -> Self {
        Self::new(id, ActorRole::Admin, ActorProfile::default())
    }

    pub fn with_profile(mut self, profile: ActorProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn profile_complete(&self) -> bool {
        self.profile.is_complete()
    }

    /// Display name for ledger entries, empty when the profile is incomplete
    #[mutants::skip] // Plain accessor
    pub fn name(&self) -> &str {
        self.profile.name.as_deref().unwrap_or_default()
    }

    #[mutants::skip] // Plain accessor
    pub fn phone(&self) -> &str {
        self.profile.phone.as_deref().unwrap_or_default()
    }

    /// Administrators manage everything; owners manage what they own
    pub fn can_manage(&self, owner_id: Uuid) -> bool {
        self.is_admin() || self.id == owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_manages_only_own_records() {
        let owner = Actor::owner(Uuid::new_v4());
        assert!(owner.can_manage(owner.id));
        assert!(!owner.can_manage(Uuid::new_v4()));
    }

    #[test]
    fn test_admin_manages_everything() {
        let admin = Actor::admin(Uuid::new_v4());
        assert!(admin.can_manage(Uuid::new_v4()));
        assert!(admin.is_admin());
    }

    #[test]
    fn test_profile_accessors() {
        let actor = Actor::owner(Uuid::new_v4())
            .with_profile(ActorProfile::new("Minji Park", "010-9876-5432"));
        assert!(actor.profile_complete());
        assert_eq!(actor.name(), "Minji Park");
        assert_eq!(actor.phone(), "010-9876-5432");

        let bare = Actor::owner(Uuid::new_v4());
        assert!(!bare.profile_complete());
        assert_eq!(bare.name(), "");
    }
}
