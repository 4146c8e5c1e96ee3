// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One command exchange over an open WebSocket.
//!
//! A [`CommandChannel`] owns the socket for exactly one command. Dropping it
//! drops the socket, so a cancelled exchange still releases the connection
//! even if [`close`](CommandChannel::close) is never reached.

use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde::Serialize;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, sleep_until};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use super::ReadPolicy;
use crate::error::ProtocolError;
use crate::response::StateResponse;

const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Result of waiting for one inbound frame.
#[derive(Debug)]
pub(crate) enum Inbound {
    /// A text frame.
    Text(String),
    /// A data frame that is not text.
    Ignored,
    /// The peer closed the socket or the transport failed.
    Closed,
    /// Nothing arrived before the frame timeout.
    TimedOut,
}

enum Event {
    Frame(Option<Result<Message, WsError>>),
    Heartbeat,
    Deadline,
}

pub(crate) struct CommandChannel<S> {
    stream: S,
    heartbeat: Option<Interval>,
}

impl<S> CommandChannel<S>
where
    S: Stream<Item = Result<Message, WsError>> + Sink<Message, Error = WsError> + Unpin,
{
    /// Wraps `stream`; a zero `heartbeat` disables keep-alive pings.
    pub(crate) fn new(stream: S, heartbeat: Duration) -> Self {
        let heartbeat = (!heartbeat.is_zero()).then(|| {
            let mut ticker = interval_at(Instant::now() + heartbeat, heartbeat);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        Self { stream, heartbeat }
    }

    /// Sends one JSON text frame.
    pub(crate) async fn send_json<T: Serialize>(&mut self, frame: &T) -> Result<(), ProtocolError> {
        let text = serde_json::to_string(frame)?;
        tracing::debug!(frame = %text, "Sending realtime command");
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    /// Waits up to `timeout` for the next data frame.
    ///
    /// Ping and pong frames do not count as frames; a ping is sent on every
    /// heartbeat tick while waiting.
    pub(crate) async fn next_frame(&mut self, timeout: Duration) -> Inbound {
        let deadline = Instant::now() + timeout;

        loop {
            let event = tokio::select! {
                frame = self.stream.next() => Event::Frame(frame),
                () = next_tick(&mut self.heartbeat) => Event::Heartbeat,
                () = sleep_until(deadline) => Event::Deadline,
            };

            match event {
                Event::Frame(Some(Ok(Message::Text(text)))) => return Inbound::Text(text),
                Event::Frame(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => {}
                Event::Frame(Some(Ok(Message::Close(frame)))) => {
                    tracing::debug!(frame = ?frame, "Realtime socket closed by server");
                    return Inbound::Closed;
                }
                Event::Frame(Some(Ok(_))) => return Inbound::Ignored,
                Event::Frame(Some(Err(err))) => {
                    tracing::debug!(error = %err, "Realtime socket failed");
                    return Inbound::Closed;
                }
                Event::Frame(None) => return Inbound::Closed,
                Event::Heartbeat => {
                    if let Err(err) = self.stream.send(Message::Ping(Vec::new())).await {
                        tracing::debug!(error = %err, "Heartbeat ping failed");
                        return Inbound::Closed;
                    }
                }
                Event::Deadline => return Inbound::TimedOut,
            }
        }
    }

    /// Reads frames until one belongs to `charger_identifier`.
    ///
    /// Frames for other chargers and undecodable frames use up an attempt.
    /// A frame timeout fails the exchange; a close ends it early.
    pub(crate) async fn await_state(
        &mut self,
        charger_identifier: &str,
        policy: ReadPolicy,
    ) -> Result<StateResponse, ProtocolError> {
        for attempt in 1..=policy.attempts {
            match self.next_frame(policy.frame_timeout).await {
                Inbound::Text(text) => match serde_json::from_str(&text) {
                    Ok(value) => {
                        let response = StateResponse::from_value(value);
                        if response.is_for(charger_identifier) {
                            return Ok(response);
                        }
                        tracing::debug!(
                            attempt,
                            other = ?response.charger_identifier(),
                            "Ignoring frame for another charger"
                        );
                    }
                    Err(err) => {
                        tracing::warn!(attempt, error = %err, "Ignoring undecodable frame");
                    }
                },
                Inbound::Ignored => {}
                Inbound::Closed => break,
                Inbound::TimedOut => {
                    return Err(ProtocolError::Timeout {
                        operation: "state response",
                        timeout_ms: u64::try_from(policy.frame_timeout.as_millis())
                            .unwrap_or(u64::MAX),
                    });
                }
            }
        }

        Err(ProtocolError::NoStateResponse)
    }

    /// Reads and discards frames until the budget is spent or the socket closes.
    ///
    /// Returns the number of frames received.
    pub(crate) async fn drain(&mut self, policy: ReadPolicy) -> usize {
        let mut received = 0;
        for _ in 0..policy.attempts {
            match self.next_frame(policy.frame_timeout).await {
                Inbound::Text(_) | Inbound::Ignored => received += 1,
                Inbound::TimedOut => {}
                Inbound::Closed => break,
            }
        }
        received
    }

    /// Sends a close frame and releases the socket.
    pub(crate) async fn close(mut self) {
        match tokio::time::timeout(CLOSE_TIMEOUT, self.stream.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::debug!(error = %err, "Realtime socket close failed"),
            Err(_) => tracing::debug!("Realtime socket close timed out"),
        }
    }
}

async fn next_tick(heartbeat: &mut Option<Interval>) {
    match heartbeat {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
