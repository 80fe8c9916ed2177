// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.
//!
//! Identity is established by an external collaborator; this module only
//! turns the identity it hands over into an `AuthenticatedActor` and decides
//! what that actor may do.

use cuebook::{Actor, ActorKind};
use cuebook_domain::Booking;

use crate::error::AuthError;

/// Actor roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// A customer.
    ///
    /// Customers may:
    /// - check availability
    /// - book a table for themselves
    /// - read and cancel their own bookings
    User,
    /// Club staff.
    ///
    /// Staff may additionally:
    /// - book on behalf of any customer
    /// - confirm, check in, and end sessions
    /// - open walk-in tables
    /// - preview bills and read reports
    Staff,
}

impl Role {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Staff => "staff",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "staff" => Ok(Self::Staff),
            _ => Err(AuthError::AuthenticationFailed {
                reason: format!("Invalid role '{s}'. Must be 'user' or 'staff'"),
            }),
        }
    }
}

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `role` - The role assigned to this actor
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }

    /// Returns true for staff.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self.role, Role::Staff)
    }

    /// Converts this actor into the actor recorded in booking history.
    #[must_use]
    pub fn to_actor(&self) -> Actor {
        let kind: ActorKind = match self.role {
            Role::User => ActorKind::User,
            Role::Staff => ActorKind::Staff,
        };
        Actor::new(self.id.clone(), kind)
    }
}

/// Builds an authenticated actor from the identity supplied upstream.
///
/// # Errors
///
/// Returns an error if the actor ID is empty or the role is unknown.
pub fn authenticate(actor_id: &str, role: &str) -> Result<AuthenticatedActor, AuthError> {
    let actor_id: &str = actor_id.trim();
    if actor_id.is_empty() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("Actor ID cannot be empty"),
        });
    }
    let role: Role = role.parse()?;
    Ok(AuthenticatedActor::new(actor_id.to_string(), role))
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that an actor holds the staff role.
    ///
    /// # Arguments
    ///
    /// * `actor` - The authenticated actor
    /// * `action` - The action name reported on refusal
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not staff.
    pub fn authorize_staff_action(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Staff => Ok(()),
            Role::User => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Staff"),
            }),
        }
    }

    /// Checks if an actor may book on behalf of `user_id`.
    ///
    /// Customers may only book for themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if a customer books for somebody else.
    pub fn authorize_book_for(
        actor: &AuthenticatedActor,
        user_id: Option<&str>,
    ) -> Result<(), AuthError> {
        match (actor.role, user_id) {
            (Role::Staff, _) | (Role::User, None) => Ok(()),
            (Role::User, Some(user_id)) if user_id == actor.id => Ok(()),
            (Role::User, Some(_)) => Err(AuthError::Unauthorized {
                action: String::from("book_for_other_user"),
                required_role: String::from("Staff"),
            }),
        }
    }

    /// Checks if an actor may cancel a booking.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor owns the booking or is staff.
    pub fn authorize_cancel(actor: &AuthenticatedActor, booking: &Booking) -> Result<(), AuthError> {
        if cuebook::may_cancel(&actor.to_actor(), booking) {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: String::from("cancel_booking"),
                required_role: String::from("owner or Staff"),
            })
        }
    }

    /// Checks if an actor may read a booking.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor owns the booking or is staff.
    pub fn authorize_view(actor: &AuthenticatedActor, booking: &Booking) -> Result<(), AuthError> {
        if actor.is_staff() || booking.user_id.as_deref() == Some(actor.id.as_str()) {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: String::from("view_booking"),
                required_role: String::from("owner or Staff"),
            })
        }
    }
}
