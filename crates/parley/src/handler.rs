//! Per-connection handler: greeting, request routing and mail delivery.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Create an unauthenticated session and arm its cleanup guard
//!   2. Send the greeting prompt
//!   3. Loop: wait for either an inbound frame or queued mail
//!      - frame → decode → [`route`] → deliver, reply (or error frame)
//!      - mail  → drain the mailbox onto the wire
//!   4. Leave the loop on Disconnect, EOF or a transport/decode failure;
//!      the guard unregisters and terminates the session

use std::sync::Arc;

use parley_protocol::{Codec, Message, ServerMessage};
use parley_router::{route, RouteError};
use parley_session::{Session, SessionId};
use parley_transport::{Connection, TransportError};
use tokio::time::{interval, Interval, MissedTickBehavior};

use crate::config::DeliveryMode;
use crate::server::ServerState;
use crate::ParleyError;

/// Drop guard that releases a session when its handler exits.
///
/// Runs on every exit path, including early returns through `?` and
/// panics. Registry and session locks are synchronous, so cleanup happens
/// inline rather than on a spawned task.
struct SessionGuard<C: Codec> {
    session: Arc<Session>,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for SessionGuard<C> {
    fn drop(&mut self) {
        let session_id = self.session.id();
        let was_live = !self.session.is_terminated();
        let removed = self.state.registry.unregister(&self.session);
        self.session.terminate();

        if was_live {
            tracing::info!(
                %session_id,
                nickname = self.session.nickname().as_deref().unwrap_or("-"),
                removed,
                "implicit disconnect"
            );
        }
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<Conn, C>(
    conn: Conn,
    state: Arc<ServerState<C>>,
) -> Result<(), ParleyError>
where
    Conn: Connection<Error = TransportError>,
    C: Codec,
{
    let conn_id = conn.id();
    let session = Arc::new(Session::new(SessionId(conn_id.into_inner())));
    let session_id = session.id();
    tracing::debug!(%conn_id, %session_id, peer = %conn.peer_addr(), "handling new connection");

    let _guard = SessionGuard {
        session: Arc::clone(&session),
        state: Arc::clone(&state),
    };

    send_frame(
        &conn,
        &state.codec,
        &ServerMessage::Prompt {
            text: state.config.greeting.clone(),
        },
    )
    .await?;

    let mut poll = match state.config.delivery {
        DeliveryMode::Push => None,
        DeliveryMode::Poll(period) => {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            Some(ticker)
        }
    };

    loop {
        tokio::select! {
            inbound = conn.recv() => {
                let data = match inbound {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%session_id, "connection closed without disconnect");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%session_id, error = %e, "recv error");
                        break;
                    }
                };

                // Undecodable input is treated like a broken transport.
                let message: Message = state.codec.decode(&data)?;
                let kind = message.kind();

                match route(&session, message, &state.registry) {
                    Ok(outcome) => {
                        outcome.deliver();
                        if let Some(text) = outcome.reply {
                            send_frame(&conn, &state.codec, &ServerMessage::Reply { text })
                                .await?;
                        }
                        if outcome.close {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!(%session_id, kind, error = %e, "request rejected");
                        send_error(&conn, &state.codec, &e).await?;
                    }
                }
            }
            () = mail_ready(&session, &mut poll) => {
                flush_mailbox(&conn, &state.codec, &session).await?;
            }
        }
    }

    if let Err(e) = conn.close().await {
        tracing::debug!(%session_id, error = %e, "close failed");
    }

    // _guard drops here → unregister + terminate.
    Ok(())
}

/// Resolves when the mailbox should be drained: on enqueue in push mode,
/// on the next tick in poll mode.
async fn mail_ready(session: &Session, poll: &mut Option<Interval>) {
    match poll {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => session.mailbox().notified().await,
    }
}

/// Writes every pending mailbox entry to the client, oldest first.
async fn flush_mailbox<Conn, C>(
    conn: &Conn,
    codec: &C,
    session: &Session,
) -> Result<(), ParleyError>
where
    Conn: Connection<Error = TransportError>,
    C: Codec,
{
    for text in session.mailbox().drain_all() {
        send_frame(conn, codec, &ServerMessage::Mail { text }).await?;
    }
    Ok(())
}

/// Sends a `ServerMessage::Error` frame for a rejected request.
async fn send_error<Conn, C>(
    conn: &Conn,
    codec: &C,
    err: &RouteError,
) -> Result<(), ParleyError>
where
    Conn: Connection<Error = TransportError>,
    C: Codec,
{
    let frame = ServerMessage::Error {
        code: err.code(),
        message: err.to_string(),
    };
    send_frame(conn, codec, &frame).await
}

async fn send_frame<Conn, C>(
    conn: &Conn,
    codec: &C,
    frame: &ServerMessage,
) -> Result<(), ParleyError>
where
    Conn: Connection<Error = TransportError>,
    C: Codec,
{
    let bytes = codec.encode(frame)?;
    conn.send(&bytes).await?;
    Ok(())
}
