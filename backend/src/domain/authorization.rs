//! Ownership checks for mutating posts.
//!
//! The guard is pure: it compares stable user identifiers and never looks at
//! usernames, so a renamed or re-registered name can never inherit access.

use tracing::warn;

use super::{Error, PostId, UserId, UserIdentity};

/// Outcome of comparing an acting user with a resource owner.
///
/// Computed per call and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationDecision {
    permitted: bool,
    acting: UserId,
    owner: UserId,
}

impl AuthorizationDecision {
    /// Whether the acting user owns the resource.
    pub fn is_permitted(&self) -> bool {
        self.permitted
    }

    /// Identifier of the user attempting the action.
    pub fn acting(&self) -> &UserId {
        &self.acting
    }

    /// Identifier recorded as the resource owner.
    pub fn owner(&self) -> &UserId {
        &self.owner
    }
}

/// Owner-only authorisation policy.
///
/// # Examples
/// ```
/// use sns_backend::domain::{AuthorizationGuard, UserId};
///
/// let owner = UserId::random();
/// let guard = AuthorizationGuard;
/// assert!(guard.evaluate(&owner, &owner).is_permitted());
/// assert!(!guard.evaluate(&UserId::random(), &owner).is_permitted());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct AuthorizationGuard;

impl AuthorizationGuard {
    /// Compare `acting` with `owner` without failing.
    pub fn evaluate(&self, acting: &UserId, owner: &UserId) -> AuthorizationDecision {
        AuthorizationDecision {
            permitted: acting == owner,
            acting: acting.clone(),
            owner: owner.clone(),
        }
    }

    /// Permit the action only when `actor` owns `post_id`.
    ///
    /// Returns `InvalidPermission` naming the actor and post otherwise.
    pub fn authorize_owner_action(
        &self,
        actor: &UserIdentity,
        owner: &UserId,
        post_id: PostId,
    ) -> Result<AuthorizationDecision, Error> {
        let decision = self.evaluate(actor.id(), owner);
        if decision.is_permitted() {
            return Ok(decision);
        }
        warn!(
            actor = %actor.username(),
            actor_id = %actor.id(),
            owner_id = %owner,
            post_id = %post_id,
            "denied mutation of post owned by another user"
        );
        Err(Error::invalid_permission(actor.username(), post_id))
    }
}
