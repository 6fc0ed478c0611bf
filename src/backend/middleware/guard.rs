/**
 * Access Control Guards
 *
 * An `AccessPolicy` is an ordered list of guards evaluated before a handler
 * runs. Evaluation stops at the first guard that fails.
 *
 * ```text
 * Unauthenticated -> TokenPresented -> Valid   -> Authorized(role)
 *                                   -> Invalid -> Rejected (401)
 * Authorized(role) -> role in set     -> Proceed
 *                  -> role not in set -> Rejected (403)
 * ```
 */

use crate::backend::auth::identity::{IdentityBackend, IdentityContext};
use crate::backend::error::{ApiError, ErrorCategory};
use crate::shared::Role;

const MISSING_TOKEN: &str = "Missing authentication token";

/// A set of roles, accepted by `Guard::RoleRequired`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet {
    mask: u8,
}

const fn bit(role: Role) -> u8 {
    1 << (role as u8)
}

impl RoleSet {
    pub const fn of(roles: &[Role]) -> Self {
        let mut mask = 0;
        let mut i = 0;
        while i < roles.len() {
            mask |= bit(roles[i]);
            i += 1;
        }
        Self { mask }
    }

    /// `{parent, admin}`
    pub const fn parent_level() -> Self {
        Self::of(&[Role::Parent, Role::Admin])
    }

    /// `{admin}`
    pub const fn admin_level() -> Self {
        Self::of(&[Role::Admin])
    }

    /// `role` and every role above it
    pub fn at_least(role: Role) -> Self {
        let mut set = Self { mask: 0 };
        for candidate in Role::ALL.into_iter().filter(|candidate| *candidate >= role) {
            set.mask |= bit(candidate);
        }
        set
    }

    pub fn contains(self, role: Role) -> bool {
        self.mask & bit(role) != 0
    }

    /// Lowest role in the set; `None` when empty
    pub fn level(self) -> Option<Role> {
        Role::ALL.into_iter().find(|role| self.contains(*role))
    }

    /// Message for a caller whose role is outside the set
    pub fn forbidden_message(self) -> &'static str {
        match self.level() {
            Some(Role::Admin) => "Admin privileges required",
            Some(Role::Parent) => "Parent privileges required",
            Some(Role::Child) => "Child privileges required",
            None => ErrorCategory::Forbidden.default_message(),
        }
    }
}

/// A single access-control check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// A valid bearer token; establishes the identity context
    TokenRequired,
    /// The established role must be in the set
    RoleRequired(RoleSet),
}

/// Extract `<token>` from `Bearer <token>`
pub fn bearer_token(authorization: Option<&str>) -> Option<&str> {
    authorization?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Ordered guards for one route group
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessPolicy {
    guards: Vec<Guard>,
}

impl AccessPolicy {
    pub fn new(guards: Vec<Guard>) -> Self {
        Self { guards }
    }

    pub fn token_required() -> Self {
        Self::new(vec![Guard::TokenRequired])
    }

    pub fn parent_level() -> Self {
        Self::token_required().then(Guard::RoleRequired(RoleSet::parent_level()))
    }

    pub fn admin_level() -> Self {
        Self::token_required().then(Guard::RoleRequired(RoleSet::admin_level()))
    }

    pub fn then(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    /// Run every guard in order against the request's `Authorization` value.
    ///
    /// Returns the identity context established along the way, if any.
    pub async fn evaluate(
        &self,
        authorization: Option<&str>,
        identity: &dyn IdentityBackend,
    ) -> Result<Option<IdentityContext>, ApiError> {
        let mut context: Option<IdentityContext> = None;
        for guard in &self.guards {
            match guard {
                Guard::TokenRequired => {
                    let Some(token) = bearer_token(authorization) else {
                        tracing::warn!("request without bearer token");
                        return Err(ApiError::unauthorized(MISSING_TOKEN));
                    };
                    context = Some(identity.verify_token(token).await?);
                }
                Guard::RoleRequired(roles) => {
                    let Some(caller) = context.as_ref() else {
                        return Err(ApiError::from_category(ErrorCategory::Unauthorized));
                    };
                    if !roles.contains(caller.role) {
                        tracing::warn!(
                            subject = %caller.subject,
                            role = %caller.role,
                            "insufficient role"
                        );
                        return Err(ApiError::forbidden(roles.forbidden_message()));
                    }
                }
            }
        }
        Ok(context)
    }
}
