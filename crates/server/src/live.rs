// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Realtime club rooms over WebSocket.
//!
//! Committed booking writes are fanned out on a single broadcast channel
//! tagged with their `club:{id}` topic. Each socket keeps its own set of
//! joined rooms and forwards only matching events.
//!
//! # Architecture
//!
//! - Events are invalidation signals; clients re-query over HTTP
//! - Delivery is best effort and at most once
//! - A slow socket drops events rather than slowing writers down
//! - No booking commands are accepted over the socket

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use cuebook::{BookingEvent, Publisher, Topic};
use futures::{SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};

/// Maximum number of events to buffer in the broadcast channel.
/// If a socket cannot keep up, its oldest pending events are dropped.
const EVENT_BUFFER_SIZE: usize = 256;

/// Frames a client sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start receiving events for a club.
    JoinClubRoom {
        /// The club.
        club_id: i64,
    },
    /// Stop receiving events for a club.
    LeaveClubRoom {
        /// The club.
        club_id: i64,
    },
}

/// Control frames the server sends. Booking events are sent as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once on connect.
    Connected {
        /// Server timestamp (RFC 3339).
        timestamp: String,
    },
    /// Acknowledges a join.
    Joined {
        /// The club.
        club_id: i64,
    },
    /// Acknowledges a leave.
    Left {
        /// The club.
        club_id: i64,
    },
    /// A frame could not be understood.
    Error {
        /// What went wrong.
        message: String,
    },
}

/// Rooms joined by one socket.
#[derive(Debug, Default)]
pub struct Rooms {
    joined: HashSet<Topic>,
}

impl Rooms {
    /// Applies a client frame and returns the acknowledgement.
    pub fn handle(&mut self, message: &ClientMessage) -> ServerMessage {
        match *message {
            ClientMessage::JoinClubRoom { club_id } => {
                self.joined.insert(Topic::club(club_id));
                ServerMessage::Joined { club_id }
            }
            ClientMessage::LeaveClubRoom { club_id } => {
                self.joined.remove(&Topic::club(club_id));
                ServerMessage::Left { club_id }
            }
        }
    }

    /// Returns true if events on `topic` should be forwarded.
    #[must_use]
    pub fn wants(&self, topic: &Topic) -> bool {
        self.joined.contains(topic)
    }
}

/// Fans booking events out to connected sockets.
///
/// This is the server's [`Publisher`]: handlers publish after commit and
/// never wait on delivery.
#[derive(Clone)]
pub struct ClubHub {
    tx: broadcast::Sender<(Topic, BookingEvent)>,
}

impl ClubHub {
    /// Creates a hub with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Subscribes to every topic; filtering by room is the caller's job.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<(Topic, BookingEvent)> {
        self.tx.subscribe()
    }
}

impl Default for ClubHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Publisher for ClubHub {
    fn publish(&self, topic: &Topic, event: &BookingEvent) {
        match self.tx.send((topic.clone(), event.clone())) {
            Ok(receivers) => debug!(%topic, receivers, "Published booking event"),
            Err(_) => debug!(%topic, "No receivers for booking event"),
        }
    }
}

/// Upgrades the connection and serves club rooms on it.
pub async fn live_events_handler(
    ws: WebSocketUpgrade,
    AxumState(hub): AxumState<Arc<ClubHub>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

fn encode<T: Serialize>(value: &T) -> Option<Message> {
    match serde_json::to_string(value) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            error!(?e, "Failed to serialize live frame");
            None
        }
    }
}

/// Serves one socket until either side goes away.
async fn handle_socket(socket: WebSocket, hub: Arc<ClubHub>) {
    info!("Client connected to live event stream");

    let (mut sender, mut receiver) = socket.split();
    let mut rx: broadcast::Receiver<(Topic, BookingEvent)> = hub.subscribe();
    let mut rooms: Rooms = Rooms::default();

    let connected = ServerMessage::Connected {
        timestamp: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| String::from("unknown")),
    };
    if let Some(frame) = encode(&connected)
        && sender.send(frame).await.is_err()
    {
        warn!("Failed to send connection confirmation");
        return;
    }

    loop {
        let outgoing: Option<Message> = tokio::select! {
            received = rx.recv() => match received {
                Ok((topic, event)) if rooms.wants(&topic) => encode(&event),
                Ok(_) => None,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Live socket lagging; events dropped");
                    None
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let reply: ServerMessage = match serde_json::from_str::<ClientMessage>(text.as_str()) {
                        Ok(message) => {
                            debug!(?message, "Room request");
                            rooms.handle(&message)
                        }
                        Err(e) => ServerMessage::Error {
                            message: format!("Unrecognized frame: {e}"),
                        },
                    };
                    encode(&reply)
                }
                Some(Ok(Message::Binary(_))) => {
                    warn!("Received binary frame from client, ignoring");
                    None
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => None,
                Some(Ok(Message::Close(_))) | None => {
                    debug!("Client closed the socket");
                    break;
                }
                Some(Err(e)) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            },
        };

        if let Some(frame) = outgoing
            && sender.send(frame).await.is_err()
        {
            break;
        }
    }

    info!("Client disconnected from live event stream");
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuebook_domain::{BookingStatus, HalfHour};
    use time::macros::date;

    fn booking_updated(club_id: i64) -> BookingEvent {
        BookingEvent::BookingUpdated {
            club_id,
            booking_id: 1,
            status: BookingStatus::Pending,
            booking_date: date!(2026 - 10 - 19),
            start_hour: HalfHour::from_hours(18.0).unwrap(),
            end_hour: Some(HalfHour::from_hours(19.0).unwrap()),
        }
    }

    #[test]
    fn test_hub_creation() {
        let hub = ClubHub::new();
        assert_eq!(hub.tx.receiver_count(), 0);
    }

    #[test]
    fn test_publish_without_receivers() {
        let hub = ClubHub::new();
        hub.publish(&Topic::club(1), &booking_updated(1));
    }

    #[test]
    fn test_every_subscriber_receives_the_event() {
        let hub = ClubHub::new();
        let mut rx1 = hub.subscribe();
        let mut rx2 = hub.subscribe();

        hub.publish(&Topic::club(1), &booking_updated(1));

        let (topic, _) = rx1.try_recv().unwrap();
        assert_eq!(topic, Topic::club(1));
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_rooms_filter_by_club() {
        let mut rooms = Rooms::default();
        assert!(!rooms.wants(&Topic::club(1)));

        let ack = rooms.handle(&ClientMessage::JoinClubRoom { club_id: 1 });
        assert_eq!(ack, ServerMessage::Joined { club_id: 1 });
        assert!(rooms.wants(&Topic::club(1)));
        assert!(!rooms.wants(&Topic::club(2)));

        let ack = rooms.handle(&ClientMessage::LeaveClubRoom { club_id: 1 });
        assert_eq!(ack, ServerMessage::Left { club_id: 1 });
        assert!(!rooms.wants(&Topic::club(1)));
    }

    #[test]
    fn test_client_frames_parse() {
        let join: ClientMessage =
            serde_json::from_str(r#"{"type":"join_club_room","club_id":7}"#).unwrap();
        assert_eq!(join, ClientMessage::JoinClubRoom { club_id: 7 });

        let leave: ClientMessage =
            serde_json::from_str(r#"{"type":"leave_club_room","club_id":7}"#).unwrap();
        assert_eq!(leave, ClientMessage::LeaveClubRoom { club_id: 7 });

        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"book","club_id":7}"#).is_err());
    }

    #[test]
    fn test_event_frame_shape() {
        let json = serde_json::to_value(booking_updated(3)).unwrap();
        assert_eq!(json["type"], "booking_updated");
        assert_eq!(json["club_id"], 3);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["booking_date"], "2026-10-19");
    }
}
