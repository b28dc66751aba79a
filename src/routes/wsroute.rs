//! Group broadcast channel: one WebSocket session actor per connection,
//! all of them sharing a single fan-out scope.
//!
//! A group send is re-emitted to every registered connection first; the
//! store append runs after the fan-out and its failure is logged only.
//! History under that policy can under-represent what clients saw, which
//! is the accepted trade-off for keeping the channel responsive.

use actix::{Actor, ActorContext, AsyncContext, Handler, Message as ActixMessage, StreamHandler};
use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use sqlx::{Pool, Postgres};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::services::MessageService;
use crate::state::AppState;
use crate::websocket::message_types::{WsInboundEvent, WsOutboundEvent};
use crate::websocket::{ConnectionId, ConnectionRegistry};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Frame fanned out by the registry, forwarded to this session's socket.
#[derive(ActixMessage)]
#[rtype(result = "()")]
struct BroadcastFrame(String);

struct WsSession {
    connection_id: ConnectionId,
    registry: ConnectionRegistry,
    db: Pool<Postgres>,
    /// Receiver handed out at registration; drained into the socket once
    /// the actor starts.
    rx: Option<UnboundedReceiver<String>>,
    hb: Instant,
}

impl WsSession {
    fn new(
        connection_id: ConnectionId,
        registry: ConnectionRegistry,
        db: Pool<Postgres>,
        rx: UnboundedReceiver<String>,
    ) -> Self {
        Self {
            connection_id,
            registry,
            db,
            rx: Some(rx),
            hb: Instant::now(),
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                tracing::warn!(connection = ?act.connection_id, "heartbeat failed, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    /// Fan the message out to everyone, then append it to the log.
    /// Broadcast comes first and is never retracted; a failed insert is
    /// logged and the sender hears nothing about it.
    fn handle_group_send(&self, user_id: i64, user_name: String, message: String) {
        let registry = self.registry.clone();
        let db = self.db.clone();

        let outbound = WsOutboundEvent::ReceiveGroupMessage {
            user_id,
            user_name: user_name.clone(),
            message: message.clone(),
        };
        let frame = match serde_json::to_string(&outbound) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize group message");
                return;
            }
        };

        actix::spawn(async move {
            let delivered = registry.broadcast(frame).await;
            tracing::debug!(user_id, delivered, "group message fanned out");

            if let Err(e) =
                MessageService::insert_group_message(&db, user_id, &user_name, &message).await
            {
                tracing::error!(error = %e, user_id, "failed to persist group message");
            }
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(connection = ?self.connection_id, "group channel session started");
        self.hb(ctx);

        // Bridge the registry's channel into this socket.
        if let Some(mut rx) = self.rx.take() {
            let addr = ctx.address();
            tokio::spawn(async move {
                while let Some(frame) = rx.recv().await {
                    addr.do_send(BroadcastFrame(frame));
                }
            });
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(connection = ?self.connection_id, "group channel session stopped");

        let registry = self.registry.clone();
        let connection_id = self.connection_id;
        actix::spawn(async move {
            registry.deregister(connection_id).await;
        });
    }
}

impl Handler<BroadcastFrame> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: BroadcastFrame, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<WsInboundEvent>(&text) {
                Ok(WsInboundEvent::SendGroupMessage {
                    user_id,
                    user_name,
                    message,
                }) => {
                    self.handle_group_send(user_id, user_name, message);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "unparseable group channel frame dropped");
                }
            },
            Ok(ws::Message::Binary(_)) => {
                tracing::warn!("binary frames are not supported on the group channel");
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::info!(?reason, "close frame received");
                ctx.stop();
            }
            Err(e) => {
                tracing::warn!(error = %e, "websocket protocol error");
                ctx.stop();
            }
            _ => {}
        }
    }
}

/// GET /ws
/// Upgrade to a group channel session. Joining is open: no credential is
/// checked and the identity on each send is whatever the client claims.
#[get("/ws")]
pub async fn ws_handler(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let (connection_id, rx) = state.registry.register().await;

    let session = WsSession::new(
        connection_id,
        state.registry.clone(),
        state.db.clone(),
        rx,
    );

    // A failed handshake never starts the session actor, so its registry
    // entry must be removed here or it lingers until the next broadcast.
    match ws::start(session, &req, stream) {
        Ok(resp) => Ok(resp),
        Err(e) => {
            state.registry.deregister(connection_id).await;
            Err(e)
        }
    }
}
