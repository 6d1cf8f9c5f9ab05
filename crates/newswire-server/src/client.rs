use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message as WsMessage, WebSocket};
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use newswire_core::NewsEvent;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(90);

/// Unique client identifier (logging only — carries no session semantics).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClientId(pub String);

impl Default for ClientId {
    fn default() -> Self {
        Self(format!("client_{}", Uuid::now_v7()))
    }
}

impl ClientId {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A connected WebSocket client.
pub struct Client {
    pub id: ClientId,
    tx: mpsc::Sender<String>,
    connected: AtomicBool,
    last_pong: AtomicU64,
}

impl Client {
    fn new(id: ClientId, tx: mpsc::Sender<String>) -> Self {
        Self {
            id,
            tx,
            connected: AtomicBool::new(true),
            last_pong: AtomicU64::new(now_secs()),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn mark_disconnected(&self) {
        self.connected.store(false, Ordering::Relaxed);
    }

    pub fn record_pong(&self) {
        self.last_pong.store(now_secs(), Ordering::Relaxed);
    }

    pub fn is_alive(&self) -> bool {
        let last = self.last_pong.load(Ordering::Relaxed);
        now_secs().saturating_sub(last) < CLIENT_TIMEOUT.as_secs()
    }
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Registry of all connected WebSocket clients.
///
/// Registration and removal are safe while a broadcast is in flight, and
/// removing an already-removed id is a no-op.
pub struct ClientRegistry {
    clients: DashMap<ClientId, Arc<Client>>,
    max_send_queue: usize,
}

impl ClientRegistry {
    pub fn new(max_send_queue: usize) -> Self {
        Self {
            clients: DashMap::new(),
            max_send_queue,
        }
    }

    /// Register a new client and return its ID + the receiving end of its
    /// send queue.
    pub fn register(&self) -> (ClientId, mpsc::Receiver<String>) {
        let id = ClientId::new();
        let (tx, rx) = mpsc::channel(self.max_send_queue);
        self.clients
            .insert(id.clone(), Arc::new(Client::new(id.clone(), tx)));
        (id, rx)
    }

    /// Remove a client by ID. Idempotent.
    pub fn unregister(&self, id: &ClientId) {
        if let Some((_, client)) = self.clients.remove(id) {
            client.mark_disconnected();
        }
    }

    /// Serialize `event` once and enqueue it to every open client.
    ///
    /// Delivery is per-client independent: a closed or saturated queue drops
    /// only that client from the registry, and the rest still get the event.
    /// Failures never reach the caller. Returns the number of clients the
    /// event was handed to; every attempt has resolved by the time it does.
    pub fn broadcast(&self, event: &NewsEvent) -> usize {
        let payload = match serde_json::to_string(event) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode broadcast event");
                return 0;
            }
        };

        let targets: Vec<Arc<Client>> = self
            .clients
            .iter()
            .filter(|entry| entry.value().is_connected())
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut delivered = 0;
        let mut dropped = Vec::new();
        for client in targets {
            match client.tx.try_send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    // A send queue that stayed full is a consumer that stopped
                    // draining — treat it like a disconnect.
                    tracing::warn!(client_id = %client.id, "send queue full, dropping client");
                    dropped.push(client.id.clone());
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    dropped.push(client.id.clone());
                }
            }
        }

        for id in &dropped {
            self.unregister(id);
        }

        tracing::debug!(
            event = event.event_type(),
            delivered,
            dropped = dropped.len(),
            "broadcast dispatched"
        );
        delivered
    }

    /// Number of connected clients.
    pub fn count(&self) -> usize {
        self.clients.len()
    }

    /// Remove clients that haven't answered a ping within the timeout.
    pub fn cleanup_dead_clients(&self) -> usize {
        let dead: Vec<ClientId> = self
            .clients
            .iter()
            .filter(|entry| !entry.value().is_alive())
            .map(|entry| entry.key().clone())
            .collect();

        let removed = dead.len();
        for id in dead {
            self.unregister(&id);
            tracing::info!(client_id = %id, "cleaned up dead client");
        }
        removed
    }

    fn get(&self, id: &ClientId) -> Option<Arc<Client>> {
        self.clients.get(id).map(|entry| Arc::clone(entry.value()))
    }
}

/// Handle a WebSocket connection: split into reader/writer, manage lifecycle
/// with a heartbeat, unregister on the way out.
pub async fn handle_ws_connection(
    socket: WebSocket,
    client_id: ClientId,
    mut rx: mpsc::Receiver<String>,
    registry: Arc<ClientRegistry>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Writer task: drain the send queue to the socket + periodic ping
    let writer_cid = client_id.clone();
    let writer_registry = Arc::clone(&registry);
    let writer = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(HEARTBEAT_INTERVAL);
        ping_interval.tick().await; // consume first immediate tick

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    match msg {
                        Some(text) => {
                            if ws_tx.send(WsMessage::Text(text.into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = ping_interval.tick() => {
                    if ws_tx.send(WsMessage::Ping(vec![].into())).await.is_err() {
                        break;
                    }
                }
            }
        }

        if let Some(client) = writer_registry.get(&writer_cid) {
            client.mark_disconnected();
        }
    });

    // Reader task: track pongs, exit on close. The channel is push-only, so
    // inbound text is ignored.
    let reader_cid = client_id.clone();
    let reader_registry = Arc::clone(&registry);
    let reader = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_rx.next().await {
            match msg {
                WsMessage::Pong(_) => {
                    if let Some(client) = reader_registry.get(&reader_cid) {
                        client.record_pong();
                    }
                }
                WsMessage::Close(_) => break,
                WsMessage::Ping(_) => {} // axum answers pongs automatically
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = writer => {},
        _ = reader => {},
    }

    registry.unregister(&client_id);
    tracing::info!(client_id = %client_id, "WebSocket client disconnected");
}

/// Start a background task that periodically reaps unresponsive clients.
pub fn start_cleanup_task(
    registry: Arc<ClientRegistry>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let removed = registry.cleanup_dead_clients();
            if removed > 0 {
                tracing::info!(removed, "dead client cleanup");
            }
        }
    })
}
