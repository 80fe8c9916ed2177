// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Realtime booking events.
//!
//! Events are invalidation signals: a client that receives one re-queries
//! availability or the booking rather than trusting the payload as state.
//! Delivery is at-most-once and happens after the write commits.

use cuebook_domain::{BookingStatus, HalfHour, TableType, iso_date};
use serde::{Deserialize, Serialize};
use time::Date;

/// A per-club broadcast channel name, `club:{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic(String);

impl Topic {
    /// The topic for a club.
    #[must_use]
    pub fn club(club_id: i64) -> Self {
        Self(format!("club:{club_id}"))
    }

    /// The topic name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An event pushed to clients subscribed to a club.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookingEvent {
    /// A booking changed status.
    BookingUpdated {
        /// The club.
        club_id: i64,
        /// The booking.
        booking_id: i64,
        /// The status after the transition.
        status: BookingStatus,
        /// The booking date.
        #[serde(with = "iso_date")]
        booking_date: Date,
        /// Start tick.
        start_hour: HalfHour,
        /// End tick, absent for open walk-ins.
        end_hour: Option<HalfHour>,
    },
    /// Capacity for a table type changed over a range.
    AvailabilityChanged {
        /// The club.
        club_id: i64,
        /// The affected table type.
        table_type: TableType,
        /// The affected date.
        #[serde(with = "iso_date")]
        booking_date: Date,
        /// Start of the affected range.
        start_hour: HalfHour,
        /// End of the affected range, absent for open walk-ins.
        end_hour: Option<HalfHour>,
    },
}

impl BookingEvent {
    /// The club this event belongs to.
    #[must_use]
    pub const fn club_id(&self) -> i64 {
        match self {
            Self::BookingUpdated { club_id, .. } | Self::AvailabilityChanged { club_id, .. } => {
                *club_id
            }
        }
    }

    /// The topic this event is published on.
    #[must_use]
    pub fn topic(&self) -> Topic {
        Topic::club(self.club_id())
    }
}

/// Fans events out to subscribers.
///
/// Implementations must not block and must not fail the caller; a publish
/// that cannot be delivered is dropped.
pub trait Publisher: Send + Sync {
    /// Publishes an event on a topic.
    fn publish(&self, topic: &Topic, event: &BookingEvent);
}

/// A publisher that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPublisher;

impl Publisher for NullPublisher {
    fn publish(&self, _topic: &Topic, _event: &BookingEvent) {}
}

/// Publishes each event on its own club topic.
pub fn publish_all(publisher: &dyn Publisher, events: &[BookingEvent]) {
    for event in events {
        publisher.publish(&event.topic(), event);
    }
}
