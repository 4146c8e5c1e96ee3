// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the realtime command protocol against an
//! in-process WebSocket server.

mod common;

use std::time::{Duration, Instant};

use common::{ScriptedServer, Step, closed_base_url, stalled_base_url, state_frame};
use serde_json::json;
use wevo_lib::error::ProtocolError;
use wevo_lib::realtime::{ReadPolicy, RealtimeClient};
use wevo_lib::types::{ChargerTarget, Connector};

const CHARGER: &str = "WEVO-0042";

fn target() -> ChargerTarget {
    ChargerTarget::new(CHARGER, Connector::new(1))
}

fn client(base_url: &str) -> RealtimeClient {
    RealtimeClient::new(base_url)
        .unwrap()
        .with_state_policy(ReadPolicy::new(5, Duration::from_millis(500)))
        .with_command_policy(ReadPolicy::new(6, Duration::from_millis(50)))
        .with_connect_timeout(Duration::from_secs(2))
}

// ============================================================================
// getState
// ============================================================================

mod get_state {
    use super::*;

    #[tokio::test]
    async fn returns_first_frame_for_the_charger() {
        let server = ScriptedServer::start(|_| {
            vec![
                Step::Send(state_frame("OTHER-1", json!(1.0), json!(1.0))),
                Step::Send(state_frame("OTHER-2", json!(2.0), json!(2.0))),
                Step::Send(json!({ "event": "heartbeat" })),
                Step::Send(state_frame(CHARGER, json!(7.4), json!(2.1))),
                Step::Send(state_frame(CHARGER, json!(99.0), json!(99.0))),
            ]
        })
        .await;

        let state = client(&server.base_url)
            .get_state("token-1", &target())
            .await
            .unwrap();

        assert_eq!(state.rate_kw(), Some(7.4));
        assert_eq!(state.total_energy_kwh(), Some(2.1));
        assert_eq!(state.state(), Some("Charging"));
    }

    #[tokio::test]
    async fn sends_command_frame_with_bearer_handshake() {
        let server =
            ScriptedServer::start(|_| vec![Step::Send(state_frame(CHARGER, json!(0), json!(0)))])
                .await;

        client(&server.base_url)
            .get_state("token-1", &target())
            .await
            .unwrap();

        let received = server.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].authorization.as_deref(), Some("Bearer token-1"));
        assert_eq!(
            received[0].command,
            json!({ "command": "getState", "chargerIdentifier": CHARGER, "connector": "1" })
        );
    }

    #[tokio::test]
    async fn fails_when_no_frame_matches() {
        let server = ScriptedServer::start(|_| {
            (0..5)
                .map(|i| Step::Send(state_frame(&format!("OTHER-{i}"), json!(1), json!(1))))
                .collect()
        })
        .await;

        let err = client(&server.base_url)
            .get_state("token-1", &target())
            .await
            .unwrap_err();

        assert!(matches!(err, ProtocolError::NoStateResponse));
        assert_eq!(err.to_string(), "no state response");
    }

    #[tokio::test]
    async fn match_after_budget_is_not_read() {
        let server = ScriptedServer::start(|_| {
            let mut steps: Vec<Step> = (0..5)
                .map(|i| Step::Send(state_frame(&format!("OTHER-{i}"), json!(1), json!(1))))
                .collect();
            steps.push(Step::Send(state_frame(CHARGER, json!(1), json!(1))));
            steps
        })
        .await;

        let err = client(&server.base_url)
            .get_state("token-1", &target())
            .await
            .unwrap_err();

        assert!(matches!(err, ProtocolError::NoStateResponse));
    }

    #[tokio::test]
    async fn undecodable_frames_are_skipped() {
        let server = ScriptedServer::start(|_| {
            vec![
                Step::SendRaw("not json".to_string()),
                Step::Send(state_frame(CHARGER, json!(3.3), json!(null))),
            ]
        })
        .await;

        let state = client(&server.base_url)
            .get_state("token-1", &target())
            .await
            .unwrap();

        assert_eq!(state.rate_kw(), Some(3.3));
        assert_eq!(state.total_energy_kwh(), None);
    }

    #[tokio::test]
    async fn server_close_ends_reading_early() {
        let server = ScriptedServer::start(|_| {
            vec![
                Step::Send(state_frame("OTHER-1", json!(1), json!(1))),
                Step::Close,
            ]
        })
        .await;

        let started = Instant::now();
        let err = client(&server.base_url)
            .get_state("token-1", &target())
            .await
            .unwrap_err();

        assert!(matches!(err, ProtocolError::NoStateResponse));
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let server = ScriptedServer::start(|_| Vec::new()).await;

        let started = Instant::now();
        let err = client(&server.base_url)
            .get_state("token-1", &target())
            .await
            .unwrap_err();

        assert!(err.is_timeout(), "unexpected error: {err}");
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn every_call_opens_its_own_connection() {
        let server =
            ScriptedServer::start(|_| vec![Step::Send(state_frame(CHARGER, json!(1), json!(1)))])
                .await;
        let client = client(&server.base_url);

        client.get_state("token-1", &target()).await.unwrap();
        client.get_state("token-2", &target()).await.unwrap();

        let received = server.received();
        assert_eq!(received.len(), 2);
        assert_eq!(received[1].authorization.as_deref(), Some("Bearer token-2"));
    }

    #[tokio::test]
    async fn zero_heartbeat_turns_pings_off() {
        let server =
            ScriptedServer::start(|_| vec![Step::Send(state_frame(CHARGER, json!(5.0), json!(1.0)))])
                .await;

        let state = client(&server.base_url)
            .with_heartbeat(Duration::ZERO)
            .get_state("token-1", &target())
            .await
            .unwrap();

        assert_eq!(state.rate_kw(), Some(5.0));
    }

    #[tokio::test]
    async fn completed_call_closes_socket() {
        let server =
            ScriptedServer::start(|_| vec![Step::Send(state_frame(CHARGER, json!(1), json!(1)))])
                .await;

        client(&server.base_url)
            .get_state("token-1", &target())
            .await
            .unwrap();

        assert!(server.wait_for_disconnects(1, Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn cancelled_call_releases_socket() {
        let server = ScriptedServer::start(|_| Vec::new()).await;
        let client = client(&server.base_url)
            .with_state_policy(ReadPolicy::new(5, Duration::from_secs(30)));

        let outcome = tokio::time::timeout(
            Duration::from_millis(300),
            client.get_state("token-1", &target()),
        )
        .await;

        assert!(outcome.is_err(), "call should still be waiting");
        assert_eq!(server.received().len(), 1);
        assert!(server.wait_for_disconnects(1, Duration::from_secs(1)).await);
    }
}

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test]
async fn stalled_handshake_times_out() {
    let base_url = stalled_base_url().await;
    let client = client(&base_url).with_connect_timeout(Duration::from_millis(200));

    let started = Instant::now();
    let err = client.get_state("token-1", &target()).await.unwrap_err();

    assert!(err.is_timeout(), "unexpected error: {err}");
    assert!(matches!(err, ProtocolError::Timeout { .. }));
    assert!(started.elapsed() < Duration::from_secs(2));
}

// ============================================================================
// authorize
// ============================================================================

mod authorize {
    use super::*;

    #[tokio::test]
    async fn silence_is_success() {
        let server = ScriptedServer::start(|_| Vec::new()).await;

        client(&server.base_url)
            .authorize("token-1", &target())
            .await
            .unwrap();

        assert_eq!(
            server.received()[0].command,
            json!({ "command": "authorize", "chargerIdentifier": CHARGER, "connector": "1" })
        );
    }

    #[tokio::test]
    async fn reply_frames_are_drained() {
        let server = ScriptedServer::start(|_| {
            vec![
                Step::Send(json!({ "result": "Accepted" })),
                Step::Wait(Duration::from_millis(20)),
                Step::Send(state_frame(CHARGER, json!(0), json!(0))),
            ]
        })
        .await;

        client(&server.base_url)
            .authorize("token-1", &target())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn server_close_is_success() {
        let server = ScriptedServer::start(|_| vec![Step::Close]).await;

        client(&server.base_url)
            .authorize("token-1", &target())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn connection_refused_is_an_error() {
        let base_url = closed_base_url().await;

        let err = client(&base_url)
            .authorize("token-1", &target())
            .await
            .unwrap_err();

        assert!(matches!(err, ProtocolError::WebSocket(_)));
    }
}
