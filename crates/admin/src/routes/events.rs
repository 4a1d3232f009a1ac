//! Server-sent event feed for open dashboards.
//!
//! Each connection owns its own realtime subscriptions and session event
//! receiver; all of them are dropped when the browser disconnects.

use std::convert::Infallible;

use axum::{
    extract::State,
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
};
use fresh_shine_core::{AdminUserId, ChangeKind, SessionEvent, Table, TableChange};
use fresh_shine_supabase::{ChangeSubscription, RealtimeHub};
use futures::{Stream, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::{
    middleware::RequireAdminAuth,
    state::AppState,
    views::{AuthGate, GateDecision},
};

/// Event sent to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    /// A watched table changed; re-fetch it.
    Change { table: Table, kind: ChangeKind },
    /// Session events were missed; reload so the gate runs again.
    Reload,
    /// This admin no longer has a session; go to the login page.
    SignedOut,
}

impl From<TableChange> for FeedEvent {
    fn from(change: TableChange) -> Self {
        Self::Change {
            table: change.table,
            kind: change.kind,
        }
    }
}

async fn next_change(subscription: &mut Option<ChangeSubscription>) -> Option<TableChange> {
    match subscription {
        Some(subscription) => subscription.next().await,
        None => std::future::pending().await,
    }
}

/// Merge table changes and this admin's session events into one feed.
///
/// Table subscriptions start when the feed is built, so changes made before
/// the first poll are not missed. The feed ends right after
/// [`FeedEvent::SignedOut`].
pub fn feed(
    user_id: AdminUserId,
    mut sessions: broadcast::Receiver<SessionEvent>,
    hub: Option<RealtimeHub>,
) -> impl Stream<Item = FeedEvent> {
    let quotes = hub.as_ref().map(|hub| hub.subscribe(Table::Quotes));
    let admin_users = hub.as_ref().map(|hub| hub.subscribe(Table::AdminUsers));

    async_stream::stream! {
        let mut gate = AuthGate::Granted(user_id);
        let mut quotes = quotes;
        let mut admin_users = admin_users;

        loop {
            let event = tokio::select! {
                received = sessions.recv() => match received {
                    Ok(event) => {
                        gate = gate.on_event(&event);
                        (gate.decision() == GateDecision::RedirectToLogin)
                            .then_some(FeedEvent::SignedOut)
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Session feed lagged");
                        Some(FeedEvent::Reload)
                    }
                    Err(RecvError::Closed) => break,
                },
                Some(change) = next_change(&mut quotes) => Some(FeedEvent::from(change)),
                Some(change) = next_change(&mut admin_users) => Some(FeedEvent::from(change)),
            };

            if let Some(event) = event {
                yield event;
                if event == FeedEvent::SignedOut {
                    break;
                }
            }
        }

        drop(hub);
        tracing::debug!(admin_id = %user_id, "Event feed closed");
    }
}

/// Stream dashboard events.
///
/// GET /events
pub async fn stream(
    State(state): State<AppState>,
    RequireAdminAuth(auth): RequireAdminAuth,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let hub = if state.config().realtime_enabled {
        RealtimeHub::connect(state.supabase(), &auth.access_token, &Table::ALL)
            .inspect_err(|e| tracing::warn!(error = %e, "Realtime unavailable"))
            .ok()
    } else {
        None
    };

    let events = feed(auth.admin.id, state.session_events().subscribe(), hub);

    let sse_stream = events.map(|event| {
        let json = serde_json::to_string(&event)
            .unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string());
        Ok(Event::default().data(json))
    });

    Sse::new(sse_stream).keep_alive(KeepAlive::default())
}
