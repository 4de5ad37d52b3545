//! Host ↔ display bridge: newline-delimited JSON over a loopback socket.
//!
//! Display surfaces are untrusted and out of process; everything they get
//! goes through this one channel. Two traffic shapes share a connection:
//!
//! - request/response: `{id, method, params?}` in,
//!   `{id, ok, data | error}` out;
//! - one-way broadcast: `{event: "alerts:new", payload}` frames, where the
//!   payload is an alert or `{ "__streamError": true, "message" }`.
//!
//! Snapshot methods answer from the per-domain caches, never by calling the
//! agent inline; `limit`/`sinceTimestamp` parameters are view filters over
//! the cached value. Each connection holds its own fan-out subscription,
//! detached on disconnect; a surface going away never disturbs its
//! siblings or the stream itself.

use log::{debug, info, warn};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use crate::sync::actions::ActionGateway;
use crate::sync::domains::Pollers;
use crate::sync::session::StreamSession;

/// Name of the one-way alert broadcast channel.
pub const ALERT_CHANNEL: &str = "alerts:new";

const DEFAULT_RISK_LIMIT: usize = 100;
const DEFAULT_LOG_LIMIT: usize = 128;

#[derive(Debug, Deserialize)]
struct Request {
    id: u64,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RiskParams {
    limit: usize,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RISK_LIMIT,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LogParams {
    since_timestamp: i64,
    limit: usize,
}

impl Default for LogParams {
    fn default() -> Self {
        Self {
            since_timestamp: 0,
            limit: DEFAULT_LOG_LIMIT,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReleaseParams {
    process_id: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StartParams {
    since_timestamp: i64,
}

impl Default for StartParams {
    fn default() -> Self {
        Self { since_timestamp: 0 }
    }
}

fn parse_params<T: DeserializeOwned + Default>(params: Value) -> Result<T, String> {
    if params.is_null() {
        Ok(T::default())
    } else {
        serde_json::from_value(params).map_err(|e| format!("bad params: {e}"))
    }
}

pub struct Bridge {
    pollers: Pollers,
    session: Arc<StreamSession>,
    actions: ActionGateway,
}

impl Bridge {
    pub fn new(pollers: Pollers, session: Arc<StreamSession>, actions: ActionGateway) -> Arc<Self> {
        Arc::new(Self {
            pollers,
            session,
            actions,
        })
    }

    /// Accept loop. Runs until the listener is dropped or the task aborted.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((socket, peer)) => {
                    info!("bridge: display surface connected from {peer}");
                    let bridge = Arc::clone(&self);
                    tokio::spawn(bridge.handle_connection(socket));
                }
                Err(e) => {
                    warn!("bridge: accept failed: {e}");
                }
            }
        }
    }

    async fn handle_connection(self: Arc<Self>, socket: TcpStream) {
        let (read_half, mut write_half) = socket.into_split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();

        // Single writer task; responses and broadcast frames share it so
        // per-connection output stays ordered.
        let writer = tokio::spawn(async move {
            while let Some(line) = out_rx.recv().await {
                if write_half.write_all(line.as_bytes()).await.is_err()
                    || write_half.write_all(b"\n").await.is_err()
                {
                    break;
                }
            }
        });

        // Event pump: this connection's fan-out subscription.
        let mut subscription = self.session.fanout().subscribe();
        let event_tx = out_tx.clone();
        let pump = tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                let frame = json!({ "event": ALERT_CHANNEL, "payload": event });
                if event_tx.send(frame.to_string()).is_err() {
                    break;
                }
            }
        });

        let mut lines = BufReader::new(read_half).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            let reply = self.dispatch(&line).await;
            if out_tx.send(reply.to_string()).is_err() {
                break;
            }
        }

        // Disconnect: drop the subscription (pump owns it) and the writer.
        pump.abort();
        drop(out_tx);
        let _ = writer.await;
        debug!("bridge: display surface disconnected");
    }

    async fn dispatch(&self, line: &str) -> Value {
        let request: Request = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                return json!({ "id": null, "ok": false, "error": format!("malformed request: {e}") });
            }
        };
        debug!("bridge: {} (id={})", request.method, request.id);
        match self.call(&request.method, request.params).await {
            Ok(data) => json!({ "id": request.id, "ok": true, "data": data }),
            Err(error) => json!({ "id": request.id, "ok": false, "error": error }),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, String> {
        match method {
            "get-system-health" => to_json(self.pollers.health.snapshot()),
            "get-process-risk-overview" => {
                let p: RiskParams = parse_params(params)?;
                let mut state = self.pollers.risk.snapshot();
                state.value.truncate(p.limit);
                to_json(state)
            }
            "get-quarantined-processes" => to_json(self.pollers.quarantine.snapshot()),
            "get-detector-logs" => {
                let p: LogParams = parse_params(params)?;
                let mut state = self.pollers.logs.snapshot();
                state.value.retain(|e| e.timestamp >= p.since_timestamp);
                state.value.truncate(p.limit);
                to_json(state)
            }
            "release-from-quarantine" => {
                let p: ReleaseParams = serde_json::from_value(params)
                    .map_err(|e| format!("bad params: {e}"))?;
                let outcome = self
                    .actions
                    .release_from_quarantine(p.process_id)
                    .await
                    .map_err(|e| e.to_string())?;
                to_json(outcome)
            }
            "alerts:start" => {
                let p: StartParams = parse_params(params)?;
                self.session
                    .start(p.since_timestamp)
                    .await
                    .map_err(|e| e.to_string())?;
                Ok(json!({ "started": true }))
            }
            "alerts:stop" => {
                self.session.stop().await;
                Ok(json!({ "stopped": true }))
            }
            _ => Err(format!("unknown method: {method}")),
        }
    }
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}
