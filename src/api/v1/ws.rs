use crate::api::RequestContext;
use crate::common::auth::Caller;
use crate::common::context::Context;
use crate::common::error::AppError;
use crate::models::frames::{ClientFrame, ServerFrame};
use crate::models::messages::Message;
use crate::models::sessions::{SessionHandle, SessionTransport};
use crate::usecases::{messages, sessions};
use anyhow::anyhow;
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::WebSocketUpgrade;
use axum::extract::ws::{CloseFrame, Message as WsMessage, WebSocket, close_code};
use axum::response::Response;
use futures::stream::SplitStream;
use futures::{Sink, SinkExt, StreamExt};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub async fn connect(ctx: RequestContext, caller: Caller, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_session(ctx, caller.user_id, socket))
}

/// Websocket side of a session handle.
///
/// Frames go through a bounded queue drained by a writer task, so a slow
/// client makes `push` wait (and the router time out) instead of buffering
/// without limit.
struct WsTransport {
    outbound: mpsc::Sender<ServerFrame>,
    closed: CancellationToken,
}

#[async_trait]
impl SessionTransport for WsTransport {
    async fn push(&self, message: &Message) -> anyhow::Result<()> {
        if self.closed.is_cancelled() {
            return Err(anyhow!("session is closed"));
        }
        let frame = ServerFrame::Message {
            message: message.clone(),
        };
        self.outbound
            .send(frame)
            .await
            .map_err(|_| anyhow!("session writer has stopped"))
    }

    fn close(&self) {
        self.closed.cancel();
    }
}

async fn run_session(ctx: RequestContext, user_id: i64, socket: WebSocket) {
    let (sink, stream) = socket.split();
    let (outbound, outbound_rx) = mpsc::channel(ctx.limits().session_buffer_size.max(1));
    let closed = CancellationToken::new();
    let transport = Arc::new(WsTransport {
        outbound: outbound.clone(),
        closed: closed.clone(),
    });
    let session = SessionHandle::new(user_id, transport);
    sessions::connect(&ctx, session.clone()).await;

    let ping_interval = ctx.limits().ping_interval;
    let writer = tokio::spawn(write_frames(sink, outbound_rx, closed.clone(), ping_interval));
    read_frames(&ctx, &session, stream, &outbound, &closed).await;

    closed.cancel();
    sessions::disconnect(&ctx, &session).await;
    if let Err(e) = writer.await {
        warn!(user_id, "Session writer task failed: {e:?}");
    }
}

/// Drains the session's outbound queue into the socket.
///
/// Pings go out every `ping_interval`; the client's pongs count as activity,
/// which keeps listen-only clients from being swept as idle.
async fn write_frames<S>(
    mut sink: S,
    mut outbound: mpsc::Receiver<ServerFrame>,
    closed: CancellationToken,
    ping_interval: Duration,
) where
    S: Sink<WsMessage> + Unpin,
    S::Error: Debug,
{
    let mut pings = tokio::time::interval_at(Instant::now() + ping_interval, ping_interval);
    pings.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let message = tokio::select! {
            _ = closed.cancelled() => break,
            _ = pings.tick() => WsMessage::Ping(Bytes::new()),
            frame = outbound.recv() => match frame {
                Some(frame) => match serde_json::to_string(&frame) {
                    Ok(text) => WsMessage::Text(text.into()),
                    Err(e) => {
                        warn!("Failed to encode frame: {e:?}");
                        continue;
                    }
                },
                None => break,
            },
        };
        if let Err(e) = sink.send(message).await {
            debug!("Failed to write to websocket: {e:?}");
            closed.cancel();
            return;
        }
    }

    let close = CloseFrame {
        code: close_code::NORMAL,
        reason: "session closed".into(),
    };
    let _ = sink.send(WsMessage::Close(Some(close))).await;
}

async fn read_frames<C: Context>(
    ctx: &C,
    session: &SessionHandle,
    mut stream: SplitStream<WebSocket>,
    outbound: &mpsc::Sender<ServerFrame>,
    closed: &CancellationToken,
) {
    loop {
        let next = tokio::select! {
            _ = closed.cancelled() => return,
            next = stream.next() => next,
        };
        let message = match next {
            Some(Ok(message)) => message,
            Some(Err(e)) => {
                debug!(user_id = session.user_id(), "Websocket read failed: {e:?}");
                return;
            }
            None => return,
        };
        session.touch();

        let reply = match message {
            WsMessage::Text(text) => handle_frame(ctx, session.user_id(), text.as_str()).await,
            WsMessage::Binary(_) => ServerFrame::from(AppError::DecodingRequestFailed),
            WsMessage::Close(_) => return,
            // pings are answered by axum, pongs to our pings only refresh liveness
            WsMessage::Ping(_) | WsMessage::Pong(_) => continue,
        };
        if outbound.send(reply).await.is_err() {
            return;
        }
    }
}

/// Handles one client frame and returns the reply for the same session.
pub async fn handle_frame<C: Context>(ctx: &C, user_id: i64, text: &str) -> ServerFrame {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(_) => return ServerFrame::from(AppError::DecodingRequestFailed),
    };
    match frame {
        ClientFrame::Ping => ServerFrame::Pong,
        ClientFrame::Send(args) => match messages::send(ctx, user_id, args).await {
            Ok(message) => ServerFrame::Sent { message },
            Err(e) => ServerFrame::from(e),
        },
    }
}
