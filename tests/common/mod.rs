// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

/// What the scripted server does after receiving a command.
#[derive(Debug, Clone)]
pub enum Step {
    /// Send a JSON text frame.
    Send(Value),
    /// Send a raw text frame.
    SendRaw(String),
    /// Pause.
    Wait(Duration),
    /// Close the connection.
    Close,
}

/// A command the server received, with the handshake's bearer header.
#[derive(Debug, Clone)]
pub struct Received {
    pub authorization: Option<String>,
    pub command: Value,
}

type Script = Arc<dyn Fn(&Value) -> Vec<Step> + Send + Sync>;

/// In-process WebSocket server that answers each command with a script.
///
/// Every connection reads one command frame, plays the steps returned by
/// the script for it, then holds the connection until the client closes or
/// goes away. Ended connections are counted.
pub struct ScriptedServer {
    pub base_url: String,
    received: Arc<Mutex<Vec<Received>>>,
    disconnects: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl ScriptedServer {
    pub async fn start<F>(script: F) -> Self
    where
        F: Fn(&Value) -> Vec<Step> + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let disconnects = Arc::new(AtomicUsize::new(0));
        let script: Script = Arc::new(script);

        let task = {
            let received = Arc::clone(&received);
            let disconnects = Arc::clone(&disconnects);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let received = Arc::clone(&received);
                    let disconnects = Arc::clone(&disconnects);
                    let script = Arc::clone(&script);
                    tokio::spawn(async move {
                        serve_connection(stream, received, script).await;
                        disconnects.fetch_add(1, Ordering::SeqCst);
                    });
                }
            })
        };

        Self {
            base_url: format!("http://{addr}"),
            received,
            disconnects,
            task,
        }
    }

    /// Number of connections that have ended.
    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    /// Waits until `count` connections have ended; false if `within` elapses first.
    pub async fn wait_for_disconnects(&self, count: usize, within: Duration) -> bool {
        let deadline = Instant::now() + within;
        while self.disconnects() < count {
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        true
    }

    /// Commands received so far, in arrival order.
    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }

    /// Names of the commands received so far.
    pub fn commands(&self) -> Vec<String> {
        self.received()
            .iter()
            .map(|r| r.command["command"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

impl Drop for ScriptedServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve_connection(
    stream: tokio::net::TcpStream,
    received: Arc<Mutex<Vec<Received>>>,
    script: Script,
) {
    let authorization = Arc::new(Mutex::new(None));
    let callback = {
        let authorization = Arc::clone(&authorization);
        move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            *authorization.lock().unwrap() = req
                .headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            Ok(resp)
        }
    };

    let Ok(mut ws) = tokio_tungstenite::accept_hdr_async(stream, callback).await else {
        return;
    };

    let command = loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => {
                break serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);
            }
            Some(Ok(_)) => {}
            _ => return,
        }
    };

    received.lock().unwrap().push(Received {
        authorization: authorization.lock().unwrap().clone(),
        command: command.clone(),
    });

    for step in script(&command) {
        match step {
            Step::Send(value) => {
                if ws.send(Message::Text(value.to_string())).await.is_err() {
                    return;
                }
            }
            Step::SendRaw(text) => {
                if ws.send(Message::Text(text)).await.is_err() {
                    return;
                }
            }
            Step::Wait(duration) => tokio::time::sleep(duration).await,
            Step::Close => {
                let _ = ws.close(None).await;
                return;
            }
        }
    }

    while let Some(Ok(_)) = ws.next().await {}
}

/// A `getState` reply for `charger`.
pub fn state_frame(charger: &str, rate_kw: Value, total_energy_kwh: Value) -> Value {
    json!({
        "chargerIdentifier": charger,
        "state": "Charging",
        "transactionData": { "rateKw": rate_kw, "totalEnergyKwh": total_energy_kwh }
    })
}

/// A successful `InitiateAuth` response body.
pub fn auth_result(access_token: &str, refresh_token: Option<&str>) -> Value {
    let mut result = json!({ "AccessToken": access_token, "ExpiresIn": 3600 });
    if let Some(refresh) = refresh_token {
        result["RefreshToken"] = json!(refresh);
    }
    json!({ "AuthenticationResult": result })
}

/// A Cognito-style error body.
pub fn auth_error(message: &str) -> Value {
    json!({ "__type": "NotAuthorizedException", "message": message })
}

/// A base URL that accepts TCP connections but never answers the handshake.
pub async fn stalled_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    format!("http://{addr}")
}

/// A base URL on which nothing is listening.
pub async fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
