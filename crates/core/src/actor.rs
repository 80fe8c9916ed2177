// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The kind of entity initiating a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// A customer acting on their own bookings.
    User,
    /// Club staff at the counter.
    Staff,
    /// A background process such as the expiry sweeper.
    System,
}

impl ActorKind {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Staff => "staff",
            Self::System => "system",
        }
    }
}

impl FromStr for ActorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "staff" => Ok(Self::Staff),
            "system" => Ok(Self::System),
            _ => Err(format!("unknown actor kind: {s}")),
        }
    }
}

/// Represents the entity performing an action.
///
/// Every transition records its actor in the booking history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// What kind of actor this is.
    pub kind: ActorKind,
}

impl Actor {
    /// Creates a new Actor.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: ActorKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    /// The actor used by background processes.
    #[must_use]
    pub fn system() -> Self {
        Self::new("system", ActorKind::System)
    }

    /// Returns true for staff and system actors.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        matches!(self.kind, ActorKind::Staff | ActorKind::System)
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}
