//! Realtime change notifications over the Phoenix channel protocol.
//!
//! A [`RealtimeHub`] owns one websocket to `/realtime/v1/websocket`, joins a
//! `postgres_changes` channel per table and fans notifications out over a
//! broadcast channel. Dropping the hub aborts the connection task, and
//! dropping a [`ChangeSubscription`] detaches that listener.
//!
//! When the connection drops the hub reconnects after [`RECONNECT_DELAY`]
//! and emits a [`ChangeKind::Resync`] per table, since changes made while it
//! was down were never delivered.

use std::time::Duration;

use fresh_shine_core::{ChangeKind, Table, TableChange};
use futures::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use url::Url;

use crate::client::SupabaseClient;
use crate::error::SupabaseError;

/// Phoenix protocol version sent in the connection URL.
const PROTOCOL_VERSION: &str = "1.0.0";

/// Interval between `phoenix` heartbeats.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);

/// Delay before reconnecting after the socket closes.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

const CHANNEL_CAPACITY: usize = 64;

/// A frame in the Phoenix channel protocol.
#[derive(Debug, Serialize, Deserialize)]
struct PhoenixMessage {
    topic: String,
    event: String,
    payload: Value,
    #[serde(rename = "ref")]
    reference: Option<String>,
}

impl PhoenixMessage {
    fn join(table: Table, access_token: &str, reference: u64) -> Self {
        Self {
            topic: topic(table),
            event: "phx_join".to_string(),
            payload: json!({
                "config": {
                    "broadcast": { "ack": false, "self": false },
                    "presence": { "key": "" },
                    "postgres_changes": [
                        { "event": "*", "schema": "public", "table": table.name() }
                    ],
                    "private": false
                },
                "access_token": access_token
            }),
            reference: Some(reference.to_string()),
        }
    }

    fn heartbeat(reference: u64) -> Self {
        Self {
            topic: "phoenix".to_string(),
            event: "heartbeat".to_string(),
            payload: json!({}),
            reference: Some(reference.to_string()),
        }
    }

    fn to_frame(&self) -> Result<Message, SupabaseError> {
        let text = serde_json::to_string(self)
            .map_err(|e| SupabaseError::Realtime(format!("Failed to encode frame: {e}")))?;
        Ok(Message::text(text))
    }

    /// The table change carried by a `postgres_changes` frame, if any.
    fn table_change(&self) -> Option<TableChange> {
        if self.event != "postgres_changes" {
            return None;
        }
        let data = self.payload.get("data")?;
        let table = data
            .get("table")
            .and_then(Value::as_str)
            .and_then(|name| name.parse().ok())
            .or_else(|| table_from_topic(&self.topic))?;
        let kind = data
            .get("type")
            .and_then(Value::as_str)
            .and_then(ChangeKind::from_postgres)?;
        Some(TableChange { table, kind })
    }
}

fn topic(table: Table) -> String {
    format!("realtime:{}-changes", table.name())
}

fn table_from_topic(topic: &str) -> Option<Table> {
    topic
        .strip_prefix("realtime:")?
        .strip_suffix("-changes")?
        .parse()
        .ok()
}

/// Build the websocket URL for a project.
fn websocket_url(base: &Url, api_key: &SecretString) -> Result<Url, SupabaseError> {
    let mut url = base.join("/realtime/v1/websocket")?;
    let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme)
        .map_err(|()| SupabaseError::Realtime(format!("cannot use {scheme} for {base}")))?;
    url.query_pairs_mut()
        .append_pair("apikey", api_key.expose_secret())
        .append_pair("vsn", PROTOCOL_VERSION);
    Ok(url)
}

/// One realtime connection, shared by any number of subscriptions.
pub struct RealtimeHub {
    sender: broadcast::Sender<TableChange>,
    task: Option<JoinHandle<()>>,
}

impl RealtimeHub {
    /// Connect in the background and watch `tables`.
    ///
    /// `access_token` is the signed-in user's JWT, so row-level security
    /// decides which changes are delivered.
    ///
    /// # Errors
    ///
    /// Returns error if the websocket URL cannot be built.
    pub fn connect(
        client: &SupabaseClient,
        access_token: &SecretString,
        tables: &[Table],
    ) -> Result<Self, SupabaseError> {
        let url = websocket_url(client.base_url(), client.api_key())?;
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        let connection = Connection {
            url,
            access_token: access_token.clone(),
            tables: tables.to_vec(),
            sender: sender.clone(),
            retry_delay: RECONNECT_DELAY,
        };
        let task = tokio::spawn(connection.run());
        Ok(Self {
            sender,
            task: Some(task),
        })
    }

    /// A hub fed from an existing channel instead of a websocket.
    ///
    /// Changes sent on `sender` reach subscriptions the same way realtime
    /// notifications do.
    #[must_use]
    pub fn from_sender(sender: broadcast::Sender<TableChange>) -> Self {
        Self { sender, task: None }
    }

    /// Listen for changes to one table.
    #[must_use]
    pub fn subscribe(&self, table: Table) -> ChangeSubscription {
        ChangeSubscription {
            table,
            receiver: self.sender.subscribe(),
        }
    }
}

impl Drop for RealtimeHub {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

impl std::fmt::Debug for RealtimeHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeHub")
            .field("subscribers", &self.sender.receiver_count())
            .finish_non_exhaustive()
    }
}

/// A listener for one table's change notifications.
#[derive(Debug)]
pub struct ChangeSubscription {
    table: Table,
    receiver: broadcast::Receiver<TableChange>,
}

impl ChangeSubscription {
    /// The watched table.
    #[must_use]
    pub const fn table(&self) -> Table {
        self.table
    }

    /// Wait for the next change to this table.
    ///
    /// Returns `None` once the hub has been dropped. A listener that falls
    /// behind gets a single [`ChangeKind::Resync`] instead of the missed events.
    pub async fn next(&mut self) -> Option<TableChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) if change.table == self.table => return Some(change),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(table = %self.table, skipped, "Realtime listener lagged");
                    return Some(TableChange {
                        table: self.table,
                        kind: ChangeKind::Resync,
                    });
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

struct Connection {
    url: Url,
    access_token: SecretString,
    tables: Vec<Table>,
    sender: broadcast::Sender<TableChange>,
    retry_delay: Duration,
}

impl Connection {
    async fn run(self) {
        let mut reconnecting = false;
        loop {
            match self.session(reconnecting).await {
                Ok(()) => info!("Realtime connection closed"),
                Err(e) => warn!(error = %e, "Realtime connection failed"),
            }
            reconnecting = true;
            tokio::time::sleep(self.retry_delay).await;
        }
    }

    async fn session(&self, reconnecting: bool) -> Result<(), SupabaseError> {
        let (socket, _) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| SupabaseError::Realtime(format!("connect failed: {e}")))?;
        let (mut write, mut read) = socket.split();
        let mut reference: u64 = 0;

        for table in &self.tables {
            reference += 1;
            let join =
                PhoenixMessage::join(*table, self.access_token.expose_secret(), reference);
            write
                .send(join.to_frame()?)
                .await
                .map_err(|e| SupabaseError::Realtime(format!("join failed: {e}")))?;
        }
        info!(tables = ?self.tables, "Realtime channels joined");

        if reconnecting {
            self.announce_resync();
        }

        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    reference += 1;
                    write
                        .send(PhoenixMessage::heartbeat(reference).to_frame()?)
                        .await
                        .map_err(|e| SupabaseError::Realtime(format!("heartbeat failed: {e}")))?;
                }
                frame = read.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => self.handle_text(text.as_str())?,
                        Some(Ok(Message::Close(_))) | None => return Ok(()),
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            return Err(SupabaseError::Realtime(format!("read failed: {e}")));
                        }
                    }
                }
            }
        }
    }

    /// Tell every listener to re-fetch, since changes made while the socket
    /// was down were never delivered.
    fn announce_resync(&self) {
        for table in &self.tables {
            let _ = self.sender.send(TableChange {
                table: *table,
                kind: ChangeKind::Resync,
            });
        }
    }

    fn handle_text(&self, text: &str) -> Result<(), SupabaseError> {
        let message: PhoenixMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, "Ignoring unparseable realtime frame");
                return Ok(());
            }
        };

        if let Some(change) = message.table_change() {
            debug!(table = %change.table, kind = ?change.kind, "Realtime change");
            // No listeners is fine; the next subscriber re-fetches anyway.
            let _ = self.sender.send(change);
            return Ok(());
        }

        match message.event.as_str() {
            "phx_reply" => {
                if message.payload.get("status").and_then(Value::as_str) == Some("error") {
                    warn!(topic = %message.topic, payload = %message.payload, "Realtime join rejected");
                }
                Ok(())
            }
            "phx_error" | "phx_close" => Err(SupabaseError::Realtime(format!(
                "channel {} closed by server",
                message.topic
            ))),
            "system" => {
                debug!(topic = %message.topic, payload = %message.payload, "Realtime system message");
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_websocket_url() {
        let base = Url::parse("https://abcd.supabase.co").unwrap();
        let url = websocket_url(&base, &SecretString::from("anon")).unwrap();
        assert_eq!(
            url.as_str(),
            "wss://abcd.supabase.co/realtime/v1/websocket?apikey=anon&vsn=1.0.0"
        );

        let local = Url::parse("http://127.0.0.1:54321").unwrap();
        let url = websocket_url(&local, &SecretString::from("anon")).unwrap();
        assert_eq!(url.scheme(), "ws");
    }

    #[test]
    fn test_join_frame_watches_all_events_on_table() {
        let join = PhoenixMessage::join(Table::AdminUsers, "jwt", 7);
        let json = serde_json::to_value(&join).unwrap();
        assert_eq!(json["topic"], "realtime:admin_users-changes");
        assert_eq!(json["event"], "phx_join");
        assert_eq!(json["ref"], "7");
        let changes = &json["payload"]["config"]["postgres_changes"][0];
        assert_eq!(changes["event"], "*");
        assert_eq!(changes["schema"], "public");
        assert_eq!(changes["table"], "admin_users");
        assert_eq!(json["payload"]["access_token"], "jwt");
    }

    #[test]
    fn test_heartbeat_frame() {
        let json = serde_json::to_value(PhoenixMessage::heartbeat(3)).unwrap();
        assert_eq!(json["topic"], "phoenix");
        assert_eq!(json["event"], "heartbeat");
    }

    #[test]
    fn test_postgres_change_is_decoded() {
        let frame = r#"{
            "topic": "realtime:quotes-changes",
            "event": "postgres_changes",
            "payload": {
                "ids": [12],
                "data": {
                    "type": "UPDATE",
                    "table": "quotes",
                    "schema": "public",
                    "commit_timestamp": "2024-05-01T10:00:00Z",
                    "record": {"status": "approved"}
                }
            },
            "ref": null
        }"#;
        let message: PhoenixMessage = serde_json::from_str(frame).unwrap();
        assert_eq!(
            message.table_change(),
            Some(TableChange {
                table: Table::Quotes,
                kind: ChangeKind::Update,
            })
        );
    }

    #[test]
    fn test_other_frames_are_not_changes() {
        let reply = r#"{"topic":"realtime:quotes-changes","event":"phx_reply","payload":{"status":"ok","response":{}},"ref":"1"}"#;
        let message: PhoenixMessage = serde_json::from_str(reply).unwrap();
        assert_eq!(message.table_change(), None);
    }

    #[test]
    fn test_table_from_topic() {
        assert_eq!(table_from_topic("realtime:quotes-changes"), Some(Table::Quotes));
        assert_eq!(table_from_topic("phoenix"), None);
    }

    #[tokio::test]
    async fn test_subscription_filters_by_table_and_ends_on_drop() {
        let (sender, _) = broadcast::channel(8);
        let hub = RealtimeHub::from_sender(sender.clone());
        let mut quotes = hub.subscribe(Table::Quotes);

        sender
            .send(TableChange {
                table: Table::AdminUsers,
                kind: ChangeKind::Insert,
            })
            .unwrap();
        sender
            .send(TableChange {
                table: Table::Quotes,
                kind: ChangeKind::Delete,
            })
            .unwrap();

        let change = quotes.next().await.unwrap();
        assert_eq!(change.kind, ChangeKind::Delete);

        drop(hub);
        drop(sender);
        assert_eq!(quotes.next().await, None);
    }

    #[tokio::test]
    async fn test_lagging_listener_gets_resync() {
        let (sender, _) = broadcast::channel(2);
        let hub = RealtimeHub::from_sender(sender.clone());
        let mut quotes = hub.subscribe(Table::Quotes);

        for _ in 0..4 {
            sender
                .send(TableChange {
                    table: Table::Quotes,
                    kind: ChangeKind::Insert,
                })
                .unwrap();
        }

        assert_eq!(
            quotes.next().await,
            Some(TableChange {
                table: Table::Quotes,
                kind: ChangeKind::Resync,
            })
        );
    }

    const INSERT_FRAME: &str = r#"{"topic":"realtime:quotes-changes","event":"postgres_changes","payload":{"data":{"type":"INSERT","table":"quotes","schema":"public"}},"ref":null}"#;

    async fn read_joins(
        socket: &mut tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
        count: usize,
    ) {
        for _ in 0..count {
            let frame = socket.next().await.unwrap().unwrap();
            let message: PhoenixMessage = serde_json::from_str(frame.to_text().unwrap()).unwrap();
            assert_eq!(message.event, "phx_join");
        }
    }

    #[tokio::test]
    async fn test_reconnect_delivers_changes_then_resync() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let tables = vec![Table::Quotes, Table::AdminUsers];

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut socket = tokio_tungstenite::accept_async(stream).await.unwrap();
            read_joins(&mut socket, 2).await;
            socket.send(Message::text(INSERT_FRAME)).await.unwrap();
            socket.close(None).await.unwrap();

            let (stream, _) = listener.accept().await.unwrap();
            let mut socket = tokio_tungstenite::accept_async(stream).await.unwrap();
            read_joins(&mut socket, 2).await;
            socket
        });

        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        let hub = RealtimeHub::from_sender(sender.clone());
        let mut quotes = hub.subscribe(Table::Quotes);
        let mut admin_users = hub.subscribe(Table::AdminUsers);
        let connection = Connection {
            url: Url::parse(&format!("ws://{addr}/realtime/v1/websocket")).unwrap(),
            access_token: SecretString::from("jwt"),
            tables,
            sender,
            retry_delay: Duration::from_millis(10),
        };
        let task = tokio::spawn(connection.run());

        let within = Duration::from_secs(5);
        let first = tokio::time::timeout(within, quotes.next()).await.unwrap();
        assert_eq!(first.unwrap().kind, ChangeKind::Insert);

        let resync = tokio::time::timeout(within, quotes.next()).await.unwrap();
        assert_eq!(resync.unwrap().kind, ChangeKind::Resync);
        let resync = tokio::time::timeout(within, admin_users.next()).await.unwrap();
        assert_eq!(
            resync,
            Some(TableChange {
                table: Table::AdminUsers,
                kind: ChangeKind::Resync,
            })
        );

        task.abort();
        drop(server.await.unwrap());
    }
}
